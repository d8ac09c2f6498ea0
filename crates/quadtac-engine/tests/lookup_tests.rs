use std::fs;
use std::path::PathBuf;

use quadtac_core::{Board, Move, MoveSource, Player};
use quadtac_engine::{
    bake, play_game, AlphaBetaConfig, AlphaBetaSearcher, BakeConfig, HeuristicEval, LookupCache,
    LookupError, LookupSearcher,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("quadtac-{}-{name}", std::process::id()))
}

fn searcher() -> AlphaBetaSearcher {
    AlphaBetaSearcher::new(AlphaBetaConfig {
        depth: 2,
        threads: 2,
        power_save: false,
    })
}

#[test]
fn miss_appends_record_and_reload_hits() {
    let path = temp_path("lookup.txt");
    let _ = fs::remove_file(&path);
    let board = Board::from_masks(0xE000, 0x0E00, Player::X).unwrap();

    let mut lookup = LookupSearcher::new(searcher(), LookupCache::open(&path).unwrap());
    assert_eq!(lookup.next_move(&board, Player::X), Move::from_cell(3));
    assert_eq!(lookup.misses(), 1);

    let key = board.encode_compact(Player::X);
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, format!("{key}->4096\n"));

    let reopened = LookupCache::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.get(key), Move::from_cell(3));

    let mut again = LookupSearcher::new(searcher(), reopened);
    assert_eq!(again.next_move(&board, Player::X), Move::from_cell(3));
    assert_eq!((again.hits(), again.misses()), (1, 0));
    fs::remove_file(&path).unwrap();
}

#[test]
fn keys_distinguish_the_side_to_move() {
    let mut cache = LookupCache::in_memory();
    let board = Board::new().apply(Move::from_cell(5).unwrap()).unwrap();
    cache
        .insert(board.encode_compact(Player::X), Move::from_cell(0).unwrap())
        .unwrap();
    assert_eq!(cache.get(board.encode_compact(Player::O)), None);
}

#[test]
fn malformed_line_reports_its_number() {
    let path = temp_path("broken.txt");
    fs::write(&path, "1->32768\n\n2 -> 16384\nnot a record\n").unwrap();
    match LookupCache::open(&path) {
        Err(LookupError::Parse { line, record, .. }) => {
            assert_eq!(line, 4);
            assert_eq!(record, "not a record");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    fs::remove_file(&path).unwrap();
}

#[test]
fn decided_board_yields_no_move_and_no_record() {
    let mut lookup = LookupSearcher::new(searcher(), LookupCache::in_memory());
    let board = Board::from_masks(0xF000, 0x0E00, Player::O).unwrap();
    assert_eq!(lookup.best_move(&board, Player::O).unwrap(), None);
    assert!(lookup.cache().is_empty());
}

#[test]
fn append_after_unterminated_last_line_stays_parseable() {
    let path = temp_path("unterminated.txt");
    fs::write(&path, "1->32768").unwrap();

    let mut cache = LookupCache::open(&path).unwrap();
    assert_eq!(cache.get(1), Move::from_cell(0));
    cache.insert(1024, Move::from_cell(0).unwrap()).unwrap();
    drop(cache);

    assert_eq!(fs::read_to_string(&path).unwrap(), "1->32768\n1024->32768\n");
    let reopened = LookupCache::open(&path).unwrap();
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get(1024), Move::from_cell(0));
    fs::remove_file(&path).unwrap();
}

#[test]
fn fixed_pairing_stops_adding_records() {
    let config = AlphaBetaConfig {
        depth: 1,
        threads: 1,
        power_save: false,
    };
    let mut opponent = AlphaBetaSearcher::with_eval(config, Box::new(HeuristicEval::new()));
    let mut lookup = LookupSearcher::new(searcher(), LookupCache::in_memory());

    play_game(&mut lookup, &mut opponent).unwrap();
    play_game(&mut opponent, &mut lookup).unwrap();
    let first_round = lookup.cache().len();
    assert!(first_round > 0);

    play_game(&mut lookup, &mut opponent).unwrap();
    play_game(&mut opponent, &mut lookup).unwrap();
    assert_eq!(lookup.cache().len(), first_round);
}

#[test]
fn bake_grows_lookup_past_a_fixed_pairing() {
    let mut lookup = LookupSearcher::new(searcher(), LookupCache::in_memory());
    let mut config = BakeConfig {
        players: 8,
        ..Default::default()
    };
    config.opponent.depth = 1;

    let stats = bake(&mut lookup, &config, &mut StdRng::seed_from_u64(11)).unwrap();
    assert_eq!(stats.games, 16);
    assert_eq!(stats.records_before, 0);
    assert_eq!(stats.records_after, lookup.cache().len());
    // One pairing in both colours records at most eight moves per game.
    assert!(stats.records_after > 16, "only {} records", stats.records_after);

    let again = bake(&mut lookup, &config, &mut StdRng::seed_from_u64(12)).unwrap();
    assert_eq!(again.records_before, stats.records_after);
    assert!(again.records_after >= again.records_before);
    assert!(lookup.hits() > 0);
}
