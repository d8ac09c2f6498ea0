use std::ops::Range;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use quadtac_core::{
    Board, Evaluator, Move, MoveSource, Player, Score, SearchLimits, SearchResult, Searcher,
};

use crate::heuristic::HeuristicEval;
use crate::score::{format_score, SCORE_INFINITY};

const DEFAULT_DEPTH: u8 = 4;
const DEFAULT_THREADS: usize = 4;

/// A 4x4 game never lasts more than 16 plies, so deeper searches add nothing.
pub const MAX_DEPTH: u8 = 16;

/// Pause after each root move in power-save mode.
pub const POWER_SAVE_PAUSE: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaBetaConfig {
    pub depth: u8,
    /// Upper bound on root-split workers, including the calling thread.
    pub threads: usize,
    pub power_save: bool,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            threads: DEFAULT_THREADS,
            power_save: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaBetaResult {
    pub best_move: Option<Move>,
    pub score: Score,
    pub depth: u8,
    /// Leaf evaluations, summed over all workers.
    pub evaluations: u64,
    pub workers: usize,
}

#[derive(Debug, Clone, Copy)]
struct ChunkBest {
    index: usize,
    mv: Move,
    score: i32,
    evaluations: u64,
}

/// Fixed-depth alpha-beta minimax that splits the root moves across worker
/// threads.
///
/// Each worker owns a private recursion over an immutable board and counts
/// its own evaluations; nothing is shared mutably.
pub struct AlphaBetaSearcher {
    eval: Box<dyn Evaluator>,
    config: AlphaBetaConfig,
}

impl std::fmt::Debug for AlphaBetaSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaBetaSearcher")
            .field("eval", &"<Evaluator>")
            .field("config", &self.config)
            .finish()
    }
}

impl Default for AlphaBetaSearcher {
    fn default() -> Self {
        Self::new(AlphaBetaConfig::default())
    }
}

impl AlphaBetaSearcher {
    pub fn new(config: AlphaBetaConfig) -> Self {
        Self::with_eval(config, Box::new(HeuristicEval::new()))
    }

    pub fn with_eval(config: AlphaBetaConfig, eval: Box<dyn Evaluator>) -> Self {
        Self { eval, config }
    }

    pub fn config(&self) -> AlphaBetaConfig {
        self.config
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.eval.as_ref()
    }

    pub fn search_with_info(&self, board: &Board) -> AlphaBetaResult {
        self.run(board, self.config.depth, self.config.threads)
    }

    pub fn search_to_depth(&self, board: &Board, depth: u8) -> AlphaBetaResult {
        self.run(board, depth, self.config.threads)
    }

    /// Same algorithm on the calling thread only.
    pub fn search_sequential(&self, board: &Board, depth: u8) -> AlphaBetaResult {
        self.run(board, depth, 1)
    }

    fn run(&self, board: &Board, depth: u8, threads: usize) -> AlphaBetaResult {
        let depth = clamp_depth(depth);
        let moves = board.available_moves();
        if board.is_game_over() || moves.is_empty() {
            let score = self.eval.evaluate(board, board.turn());
            return AlphaBetaResult {
                best_move: None,
                score,
                depth,
                evaluations: 1,
                workers: 0,
            };
        }

        let workers = threads.clamp(1, moves.len());
        let chunks = partition_moves(moves.len(), workers);
        let player = board.turn();
        let eval = self.eval.as_ref();
        let power_save = self.config.power_save;

        let bests: Vec<ChunkBest> = match chunks.split_first() {
            Some((own, rest)) if !rest.is_empty() => {
                let scoped = crossbeam::scope(|scope| {
                    let handles: Vec<_> = rest
                        .iter()
                        .cloned()
                        .map(|range| {
                            let moves = &moves;
                            scope.spawn(move |_| {
                                search_chunk(eval, board, player, moves, range, depth, power_save)
                            })
                        })
                        .collect();

                    let mut bests = Vec::with_capacity(chunks.len());
                    bests.push(search_chunk(
                        eval,
                        board,
                        player,
                        &moves,
                        own.clone(),
                        depth,
                        power_save,
                    ));
                    for handle in handles {
                        match handle.join() {
                            Ok(best) => bests.push(best),
                            Err(panic) => std::panic::resume_unwind(panic),
                        }
                    }
                    bests
                });
                match scoped {
                    Ok(bests) => bests,
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            _ => vec![search_chunk(
                eval,
                board,
                player,
                &moves,
                0..moves.len(),
                depth,
                power_save,
            )],
        };

        let evaluations = bests.iter().map(|best| best.evaluations).sum();
        let best = select_best(&bests);
        debug!(
            "depth {depth}: cell {} score {} ({evaluations} evaluations, {workers} workers)",
            best.mv.cell(),
            format_score(best.score, board.empty_cells())
        );

        AlphaBetaResult {
            best_move: Some(best.mv),
            score: Score(best.score),
            depth,
            evaluations,
            workers,
        }
    }
}

impl Searcher for AlphaBetaSearcher {
    fn search(&mut self, board: &Board, limits: SearchLimits) -> SearchResult {
        let result = self.search_to_depth(board, limits.depth.unwrap_or(self.config.depth));
        SearchResult {
            best_move: result.best_move,
            score: result.score,
            evaluations: result.evaluations,
        }
    }
}

impl MoveSource for AlphaBetaSearcher {
    /// Always searches for the side to move; a seat mismatch is left to the
    /// game loop's `apply_for`.
    fn next_move(&mut self, board: &Board, _player: Player) -> Option<Move> {
        self.search_with_info(board).best_move
    }
}

fn clamp_depth(depth: u8) -> u8 {
    if depth > MAX_DEPTH {
        warn!("search depth {depth} clamped to {MAX_DEPTH}");
    }
    depth.clamp(1, MAX_DEPTH)
}

/// Splits `count` root moves into `workers` contiguous ranges whose sizes
/// differ by at most one; the earliest ranges take the remainder.
pub fn partition_moves(count: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.clamp(1, count.max(1));
    let base = count / workers;
    let remainder = count % workers;
    let mut start = 0;
    (0..workers)
        .map(|i| {
            let len = base + usize::from(i < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Highest score wins; equal scores go to the lowest root index, so the
/// choice does not depend on how the moves were split.
fn select_best(bests: &[ChunkBest]) -> ChunkBest {
    let mut best = bests[0];
    for candidate in &bests[1..] {
        if candidate.score > best.score
            || (candidate.score == best.score && candidate.index < best.index)
        {
            best = *candidate;
        }
    }
    best
}

fn search_chunk(
    eval: &dyn Evaluator,
    board: &Board,
    player: Player,
    moves: &[Move],
    range: Range<usize>,
    depth: u8,
    power_save: bool,
) -> ChunkBest {
    let mut node = Node {
        eval,
        player,
        evaluations: 0,
    };
    let mut best = ChunkBest {
        index: range.start,
        mv: moves[range.start],
        score: -SCORE_INFINITY,
        evaluations: 0,
    };

    for index in range {
        let mv = moves[index];
        // `moves` came from `available_moves` of an undecided root.
        let Ok(child) = board.apply(mv) else {
            debug_assert!(false, "generated root move {mv:?} rejected");
            continue;
        };
        // Fail-hard: a move no better than the chunk's best returns alpha.
        let score = node.min_value(&child, depth - 1, best.score, SCORE_INFINITY);
        if score > best.score {
            best.index = index;
            best.mv = mv;
            best.score = score;
        }
        if power_save {
            thread::sleep(POWER_SAVE_PAUSE);
        }
    }

    best.evaluations = node.evaluations;
    best
}

struct Node<'a> {
    eval: &'a dyn Evaluator,
    player: Player,
    evaluations: u64,
}

impl Node<'_> {
    fn leaf(&mut self, board: &Board) -> i32 {
        self.evaluations += 1;
        self.eval.evaluate(board, self.player).0
    }

    /// Searching player to move.
    fn max_value(&mut self, board: &Board, depth: u8, mut alpha: i32, beta: i32) -> i32 {
        if depth == 0 || board.is_game_over() {
            return self.leaf(board);
        }
        // Decided boards returned above, so every generated move applies.
        for mv in board.available_moves() {
            let Ok(child) = board.apply(mv) else {
                debug_assert!(false, "generated move {mv:?} rejected");
                continue;
            };
            let score = self.min_value(&child, depth - 1, alpha, beta);
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }
        alpha
    }

    /// Opponent to move.
    fn min_value(&mut self, board: &Board, depth: u8, alpha: i32, mut beta: i32) -> i32 {
        if depth == 0 || board.is_game_over() {
            return self.leaf(board);
        }
        // Decided boards returned above, so every generated move applies.
        for mv in board.available_moves() {
            let Ok(child) = board.apply(mv) else {
                debug_assert!(false, "generated move {mv:?} rejected");
                continue;
            };
            let score = self.max_value(&child, depth - 1, alpha, beta);
            if score <= alpha {
                return alpha;
            }
            beta = beta.min(score);
        }
        beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_gives_remainder_to_earliest_chunks() {
        assert_eq!(partition_moves(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition_moves(16, 4), vec![0..4, 4..8, 8..12, 12..16]);
        assert_eq!(partition_moves(2, 5), vec![0..1, 1..2]);
        assert_eq!(partition_moves(5, 0), vec![0..5]);
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(clamp_depth(0), 1);
        assert_eq!(clamp_depth(9), 9);
        assert_eq!(clamp_depth(40), MAX_DEPTH);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let mv = |cell| Move::from_cell(cell).unwrap();
        let best = |index: usize, score: i32| ChunkBest {
            index,
            mv: mv(index as u8),
            score,
            evaluations: 0,
        };
        let bests = [best(4, 7), best(1, 7), best(9, 3)];
        assert_eq!(select_best(&bests).index, 1);
    }
}
