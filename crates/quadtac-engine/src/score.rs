use quadtac_core::{Board, Outcome, Player, Score};

/// Base magnitude of a decided game. Interior evaluations stay well below it.
pub const WIN_SCORE: i32 = 10_000;

/// Larger than any score an evaluator can return.
pub const SCORE_INFINITY: i32 = 1_000_000;

/// Value of a decided board for `player`: wins and losses are offset by the
/// number of empty cells so faster wins and slower losses rank higher.
/// Returns `None` while the game is in progress.
pub fn terminal_score(board: &Board, player: Player) -> Option<Score> {
    let margin = WIN_SCORE + board.empty_cells() as i32;
    match board.winner() {
        Outcome::InProgress => None,
        Outcome::Draw => Some(Score(0)),
        Outcome::Win(winner) if winner == player => Some(Score(margin)),
        Outcome::Win(_) => Some(Score(-margin)),
    }
}

pub fn is_win_score(score: i32) -> bool {
    score.abs() >= WIN_SCORE
}

/// Plies until the decided result, counted from the board the score was
/// measured on. Positive when winning.
pub fn win_in_n(score: i32, empty_cells: u32) -> Option<i32> {
    if !is_win_score(score) {
        return None;
    }
    let remaining = score.abs() - WIN_SCORE;
    let plies = empty_cells as i32 - remaining;
    Some(if score > 0 { plies } else { -plies })
}

/// "W3" / "-W4" for decided lines, a signed integer otherwise.
pub fn format_score(score: i32, empty_cells: u32) -> String {
    match win_in_n(score, empty_cells) {
        Some(n) if n >= 0 && score > 0 => format!("W{n}"),
        Some(n) => format!("-W{}", n.abs()),
        None if score > 0 => format!("+{score}"),
        None => score.to_string(),
    }
}
