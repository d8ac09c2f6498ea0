use std::collections::HashMap;

use quadtac_core::{Board, Player};

/// Every (x, o) pair of disjoint masks restricted to the first `cells` cells.
fn boards_over(cells: u32) -> impl Iterator<Item = (u16, u16)> {
    (0u32..3u32.pow(cells)).map(move |mut code| {
        let (mut x, mut o) = (0u16, 0u16);
        for cell in 0..cells {
            let bit = 1u16 << (15 - cell);
            match code % 3 {
                1 => x |= bit,
                2 => o |= bit,
                _ => {}
            }
            code /= 3;
        }
        (x, o)
    })
}

#[test]
fn compact_key_is_injective_over_board_and_perspective() {
    let mut seen: HashMap<u32, (u16, u16, Player)> = HashMap::new();
    for (x, o) in boards_over(9) {
        let board = Board::from_masks(x, o, Player::X).expect("disjoint masks");
        for perspective in Player::BOTH {
            let key = board.encode_compact(perspective);
            let own = (key >> 16) as u16;
            let other = key as u16;
            assert_eq!(own, board.mask(perspective));
            assert_eq!(other, board.mask(perspective.opponent()));

            if let Some(previous) = seen.insert(key, (x, o, perspective)) {
                // A key may repeat only when both pairs describe the same
                // own/opponent occupancy, i.e. colour-swapped boards.
                let (px, po, pp) = previous;
                let prev_own = if pp == Player::X { px } else { po };
                let prev_other = if pp == Player::X { po } else { px };
                assert_eq!((prev_own, prev_other), (own, other));
                assert_ne!((px, po, pp), (x, o, perspective));
            }
        }
    }
}

#[test]
fn distinct_occupancy_gives_distinct_keys() {
    let mut keys = HashMap::new();
    for (x, o) in boards_over(8) {
        let board = Board::from_masks(x, o, Player::X).unwrap();
        let key = board.encode_compact(Player::X);
        assert_eq!(keys.insert(key, (x, o)), None, "collision for {x:#06x}/{o:#06x}");
    }
}

#[test]
fn compact_key_places_perspective_mask_high() {
    let board = Board::from_masks(0x8000, 0x0001, Player::X).unwrap();
    assert_eq!(board.encode_compact(Player::X), 0x8000_0001);
    assert_eq!(board.encode_compact(Player::O), 0x0001_8000);
}
