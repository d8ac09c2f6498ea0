//! Mutation-only evolution of network evaluators through self-play.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use quadtac_core::{Player, CELL_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alphabeta::{partition_moves, AlphaBetaConfig, AlphaBetaSearcher, MAX_DEPTH};
use crate::network::{Network, NetworkError};
use crate::network_eval::NetworkEval;
use crate::network_format::{FormatError, MAX_COUNT};
use crate::population_format::PopulationSnapshot;
use crate::selfplay::{play_game, GameResult, MatchError};

#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error("population has not been initialised or loaded")]
    NotInitialized,
    #[error("invalid evolution config: {0}")]
    Config(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("game {game} failed: {source}")]
    Match { game: usize, source: MatchError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub games_per_player: usize,
    pub search_depth: u8,
    /// Root-split workers per move search.
    pub search_threads: usize,
    /// Games played concurrently within a generation.
    pub game_threads: usize,
    pub learning_rate: f64,
    pub power_save: bool,
    /// Input size followed by layer widths.
    pub architecture: Vec<usize>,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 16,
            games_per_player: 4,
            search_depth: 4,
            search_threads: 4,
            game_threads: 1,
            learning_rate: 1.0,
            power_save: false,
            architecture: vec![CELL_COUNT, 8, 1],
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, EvolutionError> {
        let content = fs::read_to_string(path).map_err(|source| EvolutionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvolutionError> {
        let fail = |msg: String| -> Result<(), EvolutionError> { Err(EvolutionError::Config(msg)) };
        let max_count = MAX_COUNT as usize;
        if self.population_size == 0 || self.population_size > max_count {
            return fail(format!("population_size must be in 1..={max_count}"));
        }
        if self.games_per_player == 0 {
            return fail("games_per_player must be > 0".into());
        }
        if self.search_depth == 0 || self.search_depth > MAX_DEPTH {
            return fail(format!("search_depth must be in 1..={MAX_DEPTH}"));
        }
        if self.search_threads == 0 || self.game_threads == 0 {
            return fail("search_threads and game_threads must be > 0".into());
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return fail("learning_rate must be finite and >= 0".into());
        }
        if self.architecture.first() != Some(&CELL_COUNT) {
            return fail(format!("architecture must start with {CELL_COUNT} inputs"));
        }
        if self.architecture.len() < 2 || self.architecture.contains(&0) {
            return fail(format!(
                "architecture {:?} needs at least one non-empty layer",
                self.architecture
            ));
        }
        // A neuron stores one weight per input plus its bias.
        let too_wide = self.architecture.iter().any(|&width| width >= max_count);
        if too_wide || self.architecture.len() > max_count {
            return fail(format!("architecture widths must be below {max_count}"));
        }
        Ok(())
    }

    fn search_config(&self) -> AlphaBetaConfig {
        AlphaBetaConfig {
            depth: self.search_depth,
            threads: self.search_threads,
            power_save: self.power_save,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub network: Arc<Network>,
    /// Accumulated over every generation the member has survived.
    pub fitness: i64,
    pub games_played: u32,
}

impl Member {
    pub fn new(network: Arc<Network>) -> Self {
        Self {
            network,
            fitness: 0,
            games_played: 0,
        }
    }
}

/// Highest fitness; the earliest member wins ties.
pub fn fittest(members: &[Member]) -> Option<&Member> {
    members
        .iter()
        .reduce(|best, member| if member.fitness > best.fitness { member } else { best })
}

/// One scheduled game: population indices of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub x: usize,
    pub o: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayedGame {
    pub pairing: Pairing,
    pub result: GameResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub games: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub best_fitness: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    Ready,
}

#[derive(Debug)]
pub struct EvolutionTrainer {
    config: EvolutionConfig,
    rng: StdRng,
    population: Vec<Member>,
    generation: u32,
    state: TrainerState,
}

impl EvolutionTrainer {
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            population: Vec::new(),
            generation: 0,
            state: TrainerState::Idle,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn population(&self) -> &[Member] {
        &self.population
    }

    pub fn generations_done(&self) -> u32 {
        self.generation
    }

    /// Replaces any current population with fresh random networks.
    pub fn init(&mut self) -> Result<(), EvolutionError> {
        let population = (0..self.config.population_size)
            .map(|_| {
                Network::random(&self.config.architecture, &mut self.rng)
                    .map(|network| Member::new(Arc::new(network)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.population = population;
        self.generation = 0;
        self.state = TrainerState::Ready;
        info!(
            "initialised {} members with architecture {:?}",
            self.population.len(),
            self.config.architecture
        );
        Ok(())
    }

    pub fn load_population(&mut self, path: &Path) -> Result<(), EvolutionError> {
        let snapshot = PopulationSnapshot::load(path)?;
        if snapshot.members.len() != self.config.population_size {
            return Err(FormatError::MemberCount {
                expected: self.config.population_size,
                found: snapshot.members.len(),
            }
            .into());
        }
        for member in &snapshot.members {
            NetworkEval::new(Arc::clone(&member.network))?;
        }
        self.population = snapshot.members;
        self.generation = snapshot.generation;
        self.state = TrainerState::Ready;
        info!(
            "loaded {} members at generation {} from {}",
            self.population.len(),
            self.generation,
            path.display()
        );
        Ok(())
    }

    pub fn snapshot(&self) -> Result<PopulationSnapshot, EvolutionError> {
        self.ensure_ready()?;
        Ok(PopulationSnapshot {
            generation: self.generation,
            members: self.population.clone(),
        })
    }

    pub fn save_population(&self, path: &Path) -> Result<(), EvolutionError> {
        self.snapshot()?.save(path)?;
        Ok(())
    }

    /// Writes `population_<generation>_<unix seconds>.dat` into `dir`.
    pub fn backup(&self, dir: &Path) -> Result<PathBuf, EvolutionError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        let path = dir.join(format!("population_{}_{stamp}.dat", self.generation));
        self.save_population(&path)?;
        info!("backup written to {}", path.display());
        Ok(path)
    }

    pub fn best_member(&self) -> Option<&Member> {
        fittest(&self.population)
    }

    pub fn run(&mut self, generations: u32) -> Result<Vec<GenerationStats>, EvolutionError> {
        self.ensure_ready()?;
        let mut all_stats = Vec::with_capacity(generations as usize);
        for _ in 0..generations {
            self.mutate()?;
            let games = self.play_round()?;
            self.select_survivors()?;
            self.generation += 1;

            let stats = self.stats_for(&games);
            info!(
                "generation {}: best fitness {}, {} games (X {} / O {} / draw {})",
                stats.generation, stats.best_fitness, stats.games, stats.x_wins, stats.o_wins,
                stats.draws
            );
            all_stats.push(stats);
        }
        Ok(all_stats)
    }

    /// Appends one perturbed child per member, doubling the population.
    pub fn mutate(&mut self) -> Result<(), EvolutionError> {
        self.ensure_ready()?;
        let rate = self.config.learning_rate;
        let children: Vec<Member> = self
            .population
            .iter()
            .map(|parent| Member::new(Arc::new(parent.network.mutated(rate, &mut self.rng))))
            .collect();
        self.population.extend(children);
        Ok(())
    }

    /// Every member plays `games_per_player` games as X against opponents
    /// drawn uniformly from the whole population, then results are applied
    /// in schedule order.
    pub fn play_round(&mut self) -> Result<Vec<PlayedGame>, EvolutionError> {
        self.ensure_ready()?;
        let schedule = self.schedule();
        let evals = self
            .population
            .iter()
            .map(|member| NetworkEval::new(Arc::clone(&member.network)).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let search = self.config.search_config();

        let outcomes = if self.config.game_threads > 1 && schedule.len() > 1 {
            play_parallel(&evals, search, &schedule, self.config.game_threads)
        } else {
            schedule
                .iter()
                .map(|pairing| play_pairing(&evals, search, *pairing))
                .collect()
        };

        let mut games = Vec::with_capacity(schedule.len());
        for (game, (pairing, outcome)) in schedule.into_iter().zip(outcomes).enumerate() {
            let result = outcome.map_err(|source| EvolutionError::Match { game, source })?;
            games.push(PlayedGame { pairing, result });
        }
        for game in &games {
            self.apply_result(game);
        }
        debug!("played {} games", games.len());
        Ok(games)
    }

    /// Stable sort by fitness, best first, truncated to `population_size`.
    pub fn select_survivors(&mut self) -> Result<(), EvolutionError> {
        self.ensure_ready()?;
        self.population.sort_by(|a, b| b.fitness.cmp(&a.fitness));
        self.population.truncate(self.config.population_size);
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), EvolutionError> {
        match self.state {
            TrainerState::Ready => Ok(()),
            TrainerState::Idle => Err(EvolutionError::NotInitialized),
        }
    }

    fn schedule(&mut self) -> Vec<Pairing> {
        let size = self.population.len();
        let mut schedule = Vec::with_capacity(size * self.config.games_per_player);
        for x in 0..size {
            for _ in 0..self.config.games_per_player {
                let o = self.rng.gen_range(0..size);
                schedule.push(Pairing { x, o });
            }
        }
        schedule
    }

    fn apply_result(&mut self, game: &PlayedGame) {
        let Pairing { x, o } = game.pairing;
        if x == o {
            self.population[x].games_played += 1;
            return;
        }
        self.population[x].fitness += game.result.points_for(Player::X);
        self.population[x].games_played += 1;
        self.population[o].fitness += game.result.points_for(Player::O);
        self.population[o].games_played += 1;
    }

    fn stats_for(&self, games: &[PlayedGame]) -> GenerationStats {
        let count = |wanted: GameResult| games.iter().filter(|g| g.result == wanted).count();
        GenerationStats {
            generation: self.generation,
            games: games.len(),
            x_wins: count(GameResult::XWin),
            o_wins: count(GameResult::OWin),
            draws: count(GameResult::Draw),
            best_fitness: self.best_member().map_or(0, |member| member.fitness),
        }
    }
}

fn play_pairing(
    evals: &[Arc<NetworkEval>],
    search: AlphaBetaConfig,
    pairing: Pairing,
) -> Result<GameResult, MatchError> {
    let mut x = AlphaBetaSearcher::with_eval(search, Box::new(Arc::clone(&evals[pairing.x])));
    let mut o = AlphaBetaSearcher::with_eval(search, Box::new(Arc::clone(&evals[pairing.o])));
    Ok(play_game(&mut x, &mut o)?.result)
}

/// Splits the schedule into contiguous slices, one per scoped thread, and
/// returns the outcomes in schedule order.
fn play_parallel(
    evals: &[Arc<NetworkEval>],
    search: AlphaBetaConfig,
    schedule: &[Pairing],
    threads: usize,
) -> Vec<Result<GameResult, MatchError>> {
    let ranges = partition_moves(schedule.len(), threads);
    let scoped = crossbeam::scope(|scope| {
        let handles: Vec<_> = ranges
            .into_iter()
            .map(|range| {
                scope.spawn(move |_| {
                    schedule[range]
                        .iter()
                        .map(|pairing| play_pairing(evals, search, *pairing))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(outcomes) => outcomes,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Vec<_>>()
    });
    match scoped {
        Ok(outcomes) => outcomes,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
