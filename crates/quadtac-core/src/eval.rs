use crate::board::Board;
use crate::types::{Player, Score};

/// Static value of a board, larger is better for `player`.
///
/// Implementations are shared read-only between search workers.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, board: &Board, player: Player) -> Score;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, board: &Board, player: Player) -> Score {
        (**self).evaluate(board, player)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for std::sync::Arc<E> {
    fn evaluate(&self, board: &Board, player: Player) -> Score {
        (**self).evaluate(board, player)
    }
}

/// Scores every board as zero. Handy as a baseline opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvaluator;

impl Evaluator for NullEvaluator {
    fn evaluate(&self, _board: &Board, _player: Player) -> Score {
        Score(0)
    }
}
