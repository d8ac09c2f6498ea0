use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use quadtac_core::{MoveSource, Player};
use quadtac_engine::evolution::fittest;
use quadtac_engine::{
    play_game, AlphaBetaConfig, AlphaBetaSearcher, GameRecord, GameResult, HeuristicEval,
    LookupCache, LookupSearcher, NetworkEval, PopulationSnapshot,
};

#[derive(Parser, Debug)]
#[command(name = "quadtac-arena", about = "Play engine A against engine B")]
struct Args {
    /// heuristic | plain | network:<population file>
    #[arg(long, default_value = "heuristic")]
    a: String,

    #[arg(long, default_value = "plain")]
    b: String,

    #[arg(long, default_value_t = 10)]
    games: u32,

    #[arg(long, default_value_t = 4)]
    depth_a: u8,

    #[arg(long, default_value_t = 4)]
    depth_b: u8,

    /// Root-split workers per search
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Route engine A through a persistent best-move file
    #[arg(long)]
    lookup: Option<PathBuf>,

    /// Write one JSON game record per line
    #[arg(long)]
    json_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchResult {
    AWin,
    BWin,
    Draw,
}

fn build_engine(engine: &str, depth: u8, threads: usize) -> Result<AlphaBetaSearcher> {
    let config = AlphaBetaConfig {
        depth,
        threads,
        ..Default::default()
    };
    let searcher = match engine.split_once(':') {
        None if engine == "heuristic" => {
            AlphaBetaSearcher::with_eval(config, Box::new(HeuristicEval::new()))
        }
        None if engine == "plain" => {
            AlphaBetaSearcher::with_eval(config, Box::new(HeuristicEval::plain()))
        }
        Some(("network", path)) => {
            let snapshot = PopulationSnapshot::load(Path::new(path))
                .with_context(|| format!("loading population {path}"))?;
            let best = fittest(&snapshot.members)
                .with_context(|| format!("population {path} is empty"))?;
            info!(
                "{path}: generation {}, best fitness {}",
                snapshot.generation, best.fitness
            );
            let eval = NetworkEval::new(Arc::clone(&best.network))?;
            AlphaBetaSearcher::with_eval(config, Box::new(eval))
        }
        _ => bail!("unknown engine '{engine}', expected heuristic, plain or network:<file>"),
    };
    Ok(searcher)
}

fn result_for_a(result: GameResult, a_side: Player) -> MatchResult {
    match result.points_for(a_side) {
        1 => MatchResult::AWin,
        -1 => MatchResult::BWin,
        _ => MatchResult::Draw,
    }
}

fn elo_diff(a_wins: u32, draws: u32, total_games: u32) -> f64 {
    if total_games == 0 {
        return 0.0;
    }
    let win_rate = (a_wins as f64 + draws as f64 * 0.5) / total_games as f64;
    if win_rate <= 0.0 {
        f64::NEG_INFINITY
    } else if win_rate >= 1.0 {
        f64::INFINITY
    } else {
        -400.0 * (1.0 / win_rate - 1.0).log10()
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let searcher_a = build_engine(&args.a, args.depth_a, args.threads)?;
    let mut engine_a: Box<dyn MoveSource> = match &args.lookup {
        Some(path) => Box::new(LookupSearcher::new(searcher_a, LookupCache::open(path)?)),
        None => Box::new(searcher_a),
    };
    let mut engine_b = build_engine(&args.b, args.depth_b, args.threads)?;

    let mut json_out = match &args.json_out {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => None,
    };

    eprintln!(
        "Running {} games: A={} (depth {}) vs B={} (depth {})",
        args.games, args.a, args.depth_a, args.b, args.depth_b
    );

    let (mut a_wins, mut b_wins, mut draws) = (0u32, 0u32, 0u32);
    for game_num in 1..=args.games {
        let a_side = if game_num % 2 == 1 { Player::X } else { Player::O };
        let record: GameRecord = match a_side {
            Player::X => play_game(engine_a.as_mut(), &mut engine_b)?,
            Player::O => play_game(&mut engine_b, engine_a.as_mut())?,
        };
        let result = result_for_a(record.result, a_side);
        match result {
            MatchResult::AWin => a_wins += 1,
            MatchResult::BWin => b_wins += 1,
            MatchResult::Draw => draws += 1,
        }
        eprintln!(
            "Game {game_num}/{}: {} plies, {} (A={})",
            args.games,
            record.plies,
            record.result.as_str(),
            a_side.symbol()
        );
        if let Some(out) = json_out.as_mut() {
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
    }
    if let Some(mut out) = json_out {
        out.flush()?;
    }

    let elo = elo_diff(a_wins, draws, args.games);
    println!(
        "A: {a_wins}W/{b_wins}L/{draws}D | B: {b_wins}W/{a_wins}L/{draws}D | Elo diff: {elo:+.1}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_specs_parse() {
        assert!(build_engine("heuristic", 2, 1).is_ok());
        assert!(build_engine("plain", 2, 1).is_ok());
        assert!(build_engine("minimax", 2, 1).is_err());
        assert!(build_engine("network:/nonexistent/population.dat", 2, 1).is_err());
    }

    #[test]
    fn elo_is_symmetric_around_even_score() {
        assert_eq!(elo_diff(5, 0, 10), 0.0);
        assert!(elo_diff(7, 0, 10) > 0.0);
        assert!(elo_diff(0, 0, 10).is_infinite());
    }
}
