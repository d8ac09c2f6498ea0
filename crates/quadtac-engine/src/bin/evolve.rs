use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quadtac_engine::evolution::fittest;
use quadtac_engine::{EvolutionConfig, EvolutionTrainer, PopulationSnapshot};

#[derive(Parser, Debug)]
#[command(name = "quadtac-evolve", about = "Evolve network evaluators through self-play")]
struct Args {
    /// Population file read and written by every subcommand
    #[arg(long, default_value = "population.dat")]
    population: PathBuf,

    /// JSON evolution config; defaults apply to missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a fresh random population
    Init,
    /// Load the population, evolve it, and save it back
    Run {
        #[arg(long, default_value_t = 1)]
        generations: u32,

        /// Write a timestamped backup into this directory after every N generations
        #[arg(long)]
        backup_dir: Option<PathBuf>,

        #[arg(long, default_value_t = 10)]
        backup_every: u32,
    },
    /// Print the fittest member
    Best,
    /// Copy the population into a timestamped backup file
    Backup {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn load_config(args: &Args) -> Result<EvolutionConfig> {
    let mut config = match &args.config {
        Some(path) => EvolutionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EvolutionConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let mut trainer = EvolutionTrainer::new(config)?;

    match &args.command {
        Command::Init => {
            trainer.init()?;
            trainer.save_population(&args.population)?;
            println!(
                "wrote {} members to {}",
                trainer.population().len(),
                args.population.display()
            );
        }
        Command::Run {
            generations,
            backup_dir,
            backup_every,
        } => {
            trainer
                .load_population(&args.population)
                .with_context(|| format!("loading {}", args.population.display()))?;
            let mut remaining = *generations;
            while remaining > 0 {
                let step = match backup_dir {
                    Some(_) => remaining.min((*backup_every).max(1)),
                    None => remaining,
                };
                for stats in trainer.run(step)? {
                    println!("{}", serde_json::to_string(&stats)?);
                }
                trainer.save_population(&args.population)?;
                if let Some(dir) = backup_dir {
                    trainer.backup(dir)?;
                }
                remaining -= step;
            }
        }
        Command::Best => {
            let snapshot = PopulationSnapshot::load(&args.population)
                .with_context(|| format!("loading {}", args.population.display()))?;
            let best = fittest(&snapshot.members).context("population is empty")?;
            println!(
                "generation {}: fitness {}, {} games, architecture {:?}",
                snapshot.generation,
                best.fitness,
                best.games_played,
                best.network.architecture()
            );
        }
        Command::Backup { dir } => {
            trainer.load_population(&args.population)?;
            let path = trainer.backup(dir)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
