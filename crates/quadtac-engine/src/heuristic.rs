use quadtac_core::{Board, Evaluator, Player, Score};

use crate::score::terminal_score;

/// Chain-score evaluation. With `use_chain_score` off, every undecided board
/// is worth zero and the search plays purely on forced results.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicEval {
    pub use_chain_score: bool,
}

impl HeuristicEval {
    pub fn new() -> Self {
        Self {
            use_chain_score: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            use_chain_score: false,
        }
    }
}

impl Default for HeuristicEval {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for HeuristicEval {
    fn evaluate(&self, board: &Board, player: Player) -> Score {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        if self.use_chain_score {
            Score(board.chain_score(player))
        } else {
            Score(0)
        }
    }
}
