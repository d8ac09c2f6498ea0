use std::fmt;

use thiserror::Error;

use crate::constants::{CELL_COUNT, EMPTY_SYMBOL, FULL_BOARD, SIDE, WIN_PATTERNS};
use crate::types::{Move, MoveList, Outcome, Player};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell {cell} is already occupied")]
    IllegalMove { cell: u8 },
    #[error("game is already over")]
    GameOver,
    #[error("move supplied by {supplied:?} but {to_move:?} is to move")]
    PlayerMismatch { supplied: Player, to_move: Player },
    #[error("occupancy masks overlap ({x:#06x} & {o:#06x})")]
    Overlap { x: u16, o: u16 },
    #[error("mask {0:#06x} is not a single cell")]
    InvalidMove(u16),
}

/// Immutable 4x4 bitboard.
///
/// The winner is computed once in the constructor so search never rescans
/// the win patterns for a board it has already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    x: u16,
    o: u16,
    turn: Player,
    outcome: Outcome,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const fn new() -> Self {
        Self::starting_with(Player::X)
    }

    pub const fn starting_with(turn: Player) -> Self {
        Self {
            x: 0,
            o: 0,
            turn,
            outcome: Outcome::InProgress,
        }
    }

    pub fn from_masks(x: u16, o: u16, turn: Player) -> Result<Self, BoardError> {
        if x & o != 0 {
            return Err(BoardError::Overlap { x, o });
        }
        Ok(Self::build(x, o, turn))
    }

    fn build(x: u16, o: u16, turn: Player) -> Self {
        Self {
            x,
            o,
            turn,
            outcome: find_outcome(x, o),
        }
    }

    pub const fn turn(&self) -> Player {
        self.turn
    }

    pub const fn winner(&self) -> Outcome {
        self.outcome
    }

    pub const fn is_game_over(&self) -> bool {
        self.outcome.is_decided()
    }

    pub const fn mask(&self, player: Player) -> u16 {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    pub const fn occupied(&self) -> u16 {
        self.x | self.o
    }

    pub const fn ply(&self) -> u32 {
        self.occupied().count_ones()
    }

    pub const fn empty_cells(&self) -> u32 {
        (!self.occupied()).count_ones()
    }

    pub fn get(&self, cell: u8) -> Option<Player> {
        let mv = Move::from_cell(cell)?;
        if self.x & mv.mask() != 0 {
            Some(Player::X)
        } else if self.o & mv.mask() != 0 {
            Some(Player::O)
        } else {
            None
        }
    }

    /// Empty cells from the most significant clear bit down, which is
    /// ascending cell index. Move ordering in search depends on this.
    pub fn available_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        let mut empty = !self.occupied();
        while empty != 0 {
            let msb = 1u16 << (15 - empty.leading_zeros());
            empty ^= msb;
            if let Some(mv) = Move::from_mask(msb) {
                moves.push(mv);
            }
        }
        moves
    }

    pub const fn is_legal(&self, mv: Move) -> bool {
        self.occupied() & mv.mask() == 0
    }

    pub fn apply(&self, mv: Move) -> Result<Self, BoardError> {
        if self.is_game_over() {
            return Err(BoardError::GameOver);
        }
        if !self.is_legal(mv) {
            return Err(BoardError::IllegalMove { cell: mv.cell() });
        }
        let next = self.turn.opponent();
        Ok(match self.turn {
            Player::X => Self::build(self.x | mv.mask(), self.o, next),
            Player::O => Self::build(self.x, self.o | mv.mask(), next),
        })
    }

    pub fn apply_for(&self, player: Player, mv: Move) -> Result<Self, BoardError> {
        if player != self.turn {
            return Err(BoardError::PlayerMismatch {
                supplied: player,
                to_move: self.turn,
            });
        }
        self.apply(mv)
    }

    pub fn apply_mask(&self, mask: u16) -> Result<Self, BoardError> {
        let mv = Move::from_mask(mask).ok_or(BoardError::InvalidMove(mask))?;
        self.apply(mv)
    }

    /// Sum of squared partial-line lengths over the lines the opponent has
    /// not blocked, plus the longest such line.
    pub fn chain_score(&self, player: Player) -> i32 {
        let own = self.mask(player);
        let other = self.mask(player.opponent());
        let mut score = 0i32;
        let mut longest = 0i32;
        for pattern in WIN_PATTERNS {
            if pattern & other != 0 {
                continue;
            }
            let chain = (pattern & own).count_ones() as i32;
            score += chain * chain;
            longest = longest.max(chain);
        }
        score + longest
    }

    pub fn encode(&self, perspective: Player) -> [f64; CELL_COUNT] {
        let own = self.mask(perspective);
        let other = self.mask(perspective.opponent());
        std::array::from_fn(|cell| {
            let bit = 1u16 << (15 - cell);
            if own & bit != 0 {
                1.0
            } else if other & bit != 0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    /// `own << 16 | opponent`, used as a lookup key.
    pub const fn encode_compact(&self, perspective: Player) -> u32 {
        let own = self.mask(perspective) as u32;
        let other = self.mask(perspective.opponent()) as u32;
        (own << 16) | other
    }
}

fn find_outcome(x: u16, o: u16) -> Outcome {
    for pattern in WIN_PATTERNS {
        if x & pattern == pattern {
            return Outcome::Win(Player::X);
        }
        if o & pattern == pattern {
            return Outcome::Win(Player::O);
        }
    }
    if x | o == FULL_BOARD {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   1 2 3 4")?;
        for row in 0..SIDE {
            write!(f, "{} ", row + 1)?;
            for col in 0..SIDE {
                let symbol = self
                    .get((row * SIDE + col) as u8)
                    .map_or(EMPTY_SYMBOL, Player::symbol);
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        match self.outcome {
            Outcome::InProgress => write!(f, "{}'s turn", self.turn.symbol()),
            Outcome::Win(player) => write!(f, "{} wins", player.symbol()),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(index: u8) -> Move {
        Move::from_cell(index).expect("valid cell")
    }

    #[test]
    fn empty_board_lists_cells_in_index_order() {
        let moves = Board::new().available_moves();
        let cells: Vec<u8> = moves.iter().map(|mv| mv.cell()).collect();
        assert_eq!(cells, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn apply_flips_turn_and_sets_mover_bit() {
        let board = Board::new().apply(cell(5)).unwrap();
        assert_eq!(board.turn(), Player::O);
        assert_eq!(board.mask(Player::X), cell(5).mask());
        assert_eq!(board.mask(Player::O), 0);
        assert_eq!(board.empty_cells(), 15);
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let board = Board::new().apply(cell(3)).unwrap();
        assert_eq!(
            board.apply(cell(3)),
            Err(BoardError::IllegalMove { cell: 3 })
        );
    }

    #[test]
    fn overlapping_masks_are_rejected() {
        assert!(matches!(
            Board::from_masks(0x0001, 0x0003, Player::X),
            Err(BoardError::Overlap { .. })
        ));
    }

    #[test]
    fn chain_score_ignores_blocked_lines() {
        // X on cell 0: row 1, column 1 and the main diagonal each hold one.
        let board = Board::new().apply(cell(0)).unwrap();
        assert_eq!(board.chain_score(Player::X), 4);
        // O blocks row 1 by playing cell 1.
        let board = board.apply(cell(1)).unwrap();
        assert_eq!(board.chain_score(Player::X), 3);
    }

    #[test]
    fn display_renders_grid() {
        let board = Board::new().apply(cell(0)).unwrap();
        let text = board.to_string();
        assert!(text.contains("1  X - - -"));
        assert!(text.ends_with("O's turn"));
    }
}
