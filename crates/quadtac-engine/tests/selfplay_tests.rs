use quadtac_core::{Board, BoardError, Move, MoveSource, Player, ScriptedMoves};
use quadtac_engine::{
    play_from, play_game, AlphaBetaConfig, AlphaBetaSearcher, GameResult, HeuristicEval,
    MatchError,
};

fn cells(list: &[u8]) -> Vec<Move> {
    list.iter().map(|&c| Move::from_cell(c).expect("valid cell")).collect()
}

/// Plays scripted moves and remembers which seat it was asked to fill.
struct SeatLog {
    moves: ScriptedMoves,
    seats: Vec<Player>,
}

impl MoveSource for SeatLog {
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        self.seats.push(player);
        self.moves.next_move(board, player)
    }
}

#[test]
fn scripted_game_reaches_a_win() {
    // X takes the top row while O fills the second.
    let mut x = ScriptedMoves::new(cells(&[0, 1, 2, 3]));
    let mut o = ScriptedMoves::new(cells(&[4, 5, 6]));
    let record = play_game(&mut x, &mut o).unwrap();
    assert_eq!(record.result, GameResult::XWin);
    assert_eq!(record.plies, 7);
    assert_eq!(record.moves, vec!["11", "21", "12", "22", "13", "23", "14"]);
}

#[test]
fn exhausted_source_aborts() {
    let mut x = ScriptedMoves::new(cells(&[0, 1]));
    let mut o = ScriptedMoves::new(cells(&[4, 5]));
    match play_game(&mut x, &mut o) {
        Err(MatchError::Aborted { player, ply }) => {
            assert_eq!(player, Player::X);
            assert_eq!(ply, 4);
        }
        other => panic!("expected abort, got {other:?}"),
    }
}

#[test]
fn occupied_cell_is_rejected() {
    let mut x = ScriptedMoves::new(cells(&[0, 1]));
    let mut o = ScriptedMoves::new(cells(&[0]));
    assert!(matches!(
        play_game(&mut x, &mut o),
        Err(MatchError::Board(BoardError::IllegalMove { cell: 0 }))
    ));
}

#[test]
fn heuristic_engines_finish_games() {
    let config = AlphaBetaConfig {
        depth: 3,
        threads: 2,
        power_save: false,
    };
    let mut x = AlphaBetaSearcher::with_eval(config, Box::new(HeuristicEval::new()));
    let mut o = AlphaBetaSearcher::with_eval(config, Box::new(HeuristicEval::plain()));
    let record = play_game(&mut x, &mut o).unwrap();
    assert!(record.plies >= 7 && record.plies <= 16);
    assert_eq!(record.moves.len() as u32, record.plies);
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"result\""));
}

#[test]
fn each_source_is_asked_for_its_own_seat() {
    let mut x = SeatLog {
        moves: ScriptedMoves::new(cells(&[0, 1, 2, 3])),
        seats: Vec::new(),
    };
    let mut o = SeatLog {
        moves: ScriptedMoves::new(cells(&[4, 5, 6])),
        seats: Vec::new(),
    };
    play_game(&mut x, &mut o).unwrap();
    assert_eq!(x.seats, vec![Player::X; 4]);
    assert_eq!(o.seats, vec![Player::O; 3]);
}

#[test]
fn start_with_o_to_move_is_a_seat_mismatch() {
    let mut x = ScriptedMoves::new(cells(&[0]));
    let mut o = ScriptedMoves::new(cells(&[4]));
    assert!(matches!(
        play_from(Board::starting_with(Player::O), &mut x, &mut o),
        Err(MatchError::Board(BoardError::PlayerMismatch {
            supplied: Player::X,
            to_move: Player::O,
        }))
    ));
}
