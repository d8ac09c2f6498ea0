pub mod board;
pub mod constants;
pub mod eval;
pub mod notation;
pub mod search;
pub mod types;

pub use board::{Board, BoardError};
pub use constants::{CELL_COUNT, FULL_BOARD, WIN_PATTERNS};
pub use eval::{Evaluator, NullEvaluator};
pub use notation::{move_to_notation, parse_notation, NotationError};
pub use search::{MoveSource, ScriptedMoves, SearchLimits, SearchResult, Searcher};
pub use types::{Move, MoveList, Outcome, Player, Score};
