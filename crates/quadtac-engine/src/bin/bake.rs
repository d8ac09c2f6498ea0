use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quadtac_engine::{
    bake, AlphaBetaConfig, AlphaBetaSearcher, BakeConfig, LookupCache, LookupSearcher,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(
    name = "quadtac-bake",
    about = "Fill a lookup file by playing it against random network engines"
)]
struct Args {
    /// Lookup file to load and append to
    #[arg(long, default_value = "lookup.txt")]
    lookup: PathBuf,

    /// Random opponents; each plays one game as X and one as O
    #[arg(long, default_value_t = 10)]
    players: usize,

    /// Search depth behind the lookup table
    #[arg(long, default_value_t = 4)]
    depth: u8,

    #[arg(long, default_value_t = 3)]
    opponent_depth: u8,

    /// Root-split workers for the lookup's search
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Seed for the opponents' random weights
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cache = LookupCache::open(&args.lookup)
        .with_context(|| format!("opening lookup {}", args.lookup.display()))?;
    let searcher = AlphaBetaSearcher::new(AlphaBetaConfig {
        depth: args.depth,
        threads: args.threads,
        ..Default::default()
    });
    let mut lookup = LookupSearcher::new(searcher, cache);

    let mut config = BakeConfig {
        players: args.players,
        ..Default::default()
    };
    config.opponent.depth = args.opponent_depth;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let stats = bake(&mut lookup, &config, &mut rng)?;

    println!(
        "{} games: {} -> {} records ({} hits, {} misses)",
        stats.games,
        stats.records_before,
        stats.records_after,
        lookup.hits(),
        lookup.misses()
    );
    Ok(())
}
