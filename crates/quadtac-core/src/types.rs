use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::constants::CELL_COUNT;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X = 0,
    O = 1,
}

impl Player {
    pub const BOTH: [Self; 2] = [Self::X, Self::O];

    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }

    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'X' | 'x' => Some(Self::X),
            'O' | 'o' => Some(Self::O),
            _ => None,
        }
    }
}

/// Terminal status of a board, computed once when the board is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Win(Player),
    Draw,
}

impl Outcome {
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            Self::Win(player) => Some(player),
            Self::InProgress | Self::Draw => None,
        }
    }
}

/// One cell of the board as a single-bit mask.
///
/// Cell index `i` (row-major, top-left is 0) maps to bit `15 - i`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Move(u16);

impl Move {
    pub const fn from_cell(cell: u8) -> Option<Self> {
        if (cell as usize) < CELL_COUNT {
            Some(Self(1 << (15 - cell)))
        } else {
            None
        }
    }

    pub const fn from_mask(mask: u16) -> Option<Self> {
        if mask.count_ones() == 1 {
            Some(Self(mask))
        } else {
            None
        }
    }

    pub const fn from_row_col(row: u8, col: u8) -> Option<Self> {
        if row < 4 && col < 4 {
            Self::from_cell(row * 4 + col)
        } else {
            None
        }
    }

    pub const fn mask(self) -> u16 {
        self.0
    }

    pub const fn cell(self) -> u8 {
        15 - self.0.trailing_zeros() as u8
    }

    pub const fn row(self) -> u8 {
        self.cell() / 4
    }

    pub const fn col(self) -> u8 {
        self.cell() % 4
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Score(pub i32);

pub type MoveList = ArrayVec<Move, CELL_COUNT>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_and_mask_agree() {
        for cell in 0..16u8 {
            let mv = Move::from_cell(cell).expect("valid cell");
            assert_eq!(mv.cell(), cell);
            assert_eq!(Move::from_mask(mv.mask()), Some(mv));
            assert_eq!(Move::from_row_col(mv.row(), mv.col()), Some(mv));
        }
        assert_eq!(Move::from_cell(0).map(Move::mask), Some(0x8000));
        assert_eq!(Move::from_cell(15).map(Move::mask), Some(0x0001));
    }

    #[test]
    fn rejects_bad_cells_and_masks() {
        assert_eq!(Move::from_cell(16), None);
        assert_eq!(Move::from_mask(0), None);
        assert_eq!(Move::from_mask(0b11), None);
        assert_eq!(Move::from_row_col(4, 0), None);
    }

    #[test]
    fn player_symbols_round_trip() {
        for player in Player::BOTH {
            assert_eq!(Player::from_symbol(player.symbol()), Some(player));
            assert_eq!(player.opponent().opponent(), player);
        }
        assert_eq!(Player::from_symbol('-'), None);
    }
}
