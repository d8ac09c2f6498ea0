use crate::board::Board;
use crate::types::{Move, Player, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    pub depth: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: Score,
    pub evaluations: u64,
}

pub trait Searcher {
    fn search(&mut self, board: &Board, limits: SearchLimits) -> SearchResult;
}

/// Anything that can pick a move for `player` on `board`: a search engine,
/// a lookup table, or a human at a prompt.
///
/// `player` is the side the source was seated as, which the game loop also
/// hands to `Board::apply_for`. `None` aborts the game.
pub trait MoveSource {
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move>;
}

impl<S: MoveSource + ?Sized> MoveSource for &mut S {
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        (**self).next_move(board, player)
    }
}

impl<S: MoveSource + ?Sized> MoveSource for Box<S> {
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        (**self).next_move(board, player)
    }
}

/// Replays a fixed list of moves, then aborts.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMoves {
    moves: Vec<Move>,
    next: usize,
}

impl ScriptedMoves {
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves, next: 0 }
    }
}

impl MoveSource for ScriptedMoves {
    fn next_move(&mut self, _board: &Board, _player: Player) -> Option<Move> {
        let mv = self.moves.get(self.next).copied();
        self.next += 1;
        mv
    }
}
