pub const CELL_COUNT: usize = 16;
pub const SIDE: usize = 4;

pub const FULL_BOARD: u16 = 0xFFFF;

pub const EMPTY_SYMBOL: char = '-';

/// Rows 1-4, columns 1-4, then the `\` and `/` diagonals.
pub const WIN_PATTERNS: [u16; 10] = [
    0xF000, 0x0F00, 0x00F0, 0x000F, 0x8888, 0x4444, 0x2222, 0x1111, 0x8421, 0x1248,
];
