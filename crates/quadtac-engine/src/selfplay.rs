use quadtac_core::{move_to_notation, Board, BoardError, MoveSource, Outcome, Player};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{player:?} supplied no move at ply {ply}")]
    Aborted { player: Player, ply: u32 },
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    XWin,
    OWin,
    Draw,
}

impl GameResult {
    /// `None` while the game is still running.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::InProgress => None,
            Outcome::Win(Player::X) => Some(Self::XWin),
            Outcome::Win(Player::O) => Some(Self::OWin),
            Outcome::Draw => Some(Self::Draw),
        }
    }

    /// +1 for a win, -1 for a loss, 0 for a draw.
    pub fn points_for(self, player: Player) -> i64 {
        match (self, player) {
            (Self::Draw, _) => 0,
            (Self::XWin, Player::X) | (Self::OWin, Player::O) => 1,
            _ => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::XWin => "1-0",
            Self::OWin => "0-1",
            Self::Draw => "1/2-1/2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Cell names in play order, starting with X.
    pub moves: Vec<String>,
    pub result: GameResult,
    pub plies: u32,
}

/// Plays one game from the empty board, X moving first, until the board is
/// decided.
pub fn play_game(
    x: &mut dyn MoveSource,
    o: &mut dyn MoveSource,
) -> Result<GameRecord, MatchError> {
    play_from(Board::new(), x, o)
}

/// Seats `x` and `o` and lets them alternate, `x` first, each asked for a
/// move under its own seat tag. Every move is applied with `apply_for` on
/// behalf of that seat, so a board whose side to move disagrees with the
/// seat is rejected with `BoardError::PlayerMismatch`.
pub fn play_from(
    mut board: Board,
    x: &mut dyn MoveSource,
    o: &mut dyn MoveSource,
) -> Result<GameRecord, MatchError> {
    let mut moves = Vec::new();
    let mut seat = Player::X;
    loop {
        if let Some(result) = GameResult::from_outcome(board.winner()) {
            return Ok(GameRecord {
                plies: moves.len() as u32,
                moves,
                result,
            });
        }

        let mv = match seat {
            Player::X => x.next_move(&board, seat),
            Player::O => o.next_move(&board, seat),
        };
        let mv = mv.ok_or(MatchError::Aborted {
            player: seat,
            ply: board.ply(),
        })?;
        board = board.apply_for(seat, mv)?;
        moves.push(move_to_notation(mv));
        seat = seat.opponent();
    }
}
