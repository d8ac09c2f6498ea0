use thiserror::Error;

use crate::types::Move;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("expected two digits (row, column), got {0:?}")]
    Malformed(String),
    #[error("cell {0:?} is off the board")]
    OutOfRange(String),
}

/// Row digit then column digit, both 1-based: `"11"` is the top-left cell,
/// `"44"` the bottom-right.
pub fn move_to_notation(mv: Move) -> String {
    format!("{}{}", mv.row() + 1, mv.col() + 1)
}

pub fn parse_notation(text: &str) -> Result<Move, NotationError> {
    let trimmed = text.trim();
    let mut digits = trimmed.chars().map(|c| c.to_digit(10));
    let (Some(Some(row)), Some(Some(col)), None) = (digits.next(), digits.next(), digits.next())
    else {
        return Err(NotationError::Malformed(trimmed.to_owned()));
    };
    if !(1..=4).contains(&row) || !(1..=4).contains(&col) {
        return Err(NotationError::OutOfRange(trimmed.to_owned()));
    }
    Move::from_row_col((row - 1) as u8, (col - 1) as u8)
        .ok_or_else(|| NotationError::OutOfRange(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners() {
        assert_eq!(parse_notation("11"), Ok(Move::from_cell(0).unwrap()));
        assert_eq!(parse_notation("14"), Ok(Move::from_cell(3).unwrap()));
        assert_eq!(parse_notation(" 44 "), Ok(Move::from_cell(15).unwrap()));
    }

    #[test]
    fn every_cell_round_trips() {
        for cell in 0..16 {
            let mv = Move::from_cell(cell).unwrap();
            assert_eq!(parse_notation(&move_to_notation(mv)), Ok(mv));
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse_notation("5"), Err(NotationError::Malformed(_))));
        assert!(matches!(parse_notation("123"), Err(NotationError::Malformed(_))));
        assert!(matches!(parse_notation("ab"), Err(NotationError::Malformed(_))));
        assert!(matches!(parse_notation("05"), Err(NotationError::OutOfRange(_))));
        assert!(matches!(parse_notation("45"), Err(NotationError::OutOfRange(_))));
    }
}
