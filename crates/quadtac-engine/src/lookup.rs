//! Persistent best-move cache keyed by `Board::encode_compact(mover)`.
//!
//! The file is plain text, one `key->move` record per line, where `move` is
//! the 16-bit cell mask in decimal. Records are only ever appended.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use quadtac_core::{Board, Move, MoveSource, Player, CELL_COUNT};
use rand::Rng;
use thiserror::Error;

use crate::alphabeta::{AlphaBetaConfig, AlphaBetaSearcher};
use crate::network::{Network, NetworkError};
use crate::network_eval::NetworkEval;
use crate::selfplay::{play_game, MatchError};

const SEPARATOR: &str = "->";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{path}:{line}: malformed record {record:?}")]
    Parse {
        path: PathBuf,
        line: usize,
        record: String,
    },
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Default)]
pub struct LookupCache {
    entries: HashMap<u32, Move>,
    file: Option<(PathBuf, File)>,
}

impl LookupCache {
    /// In-memory cache with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads every record from `path`, creating the file when missing, and
    /// keeps it open for appends.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| LookupError::Io {
            path: path.clone(),
            source,
        };

        let content = if path.exists() {
            fs::read_to_string(&path).map_err(io_err)?
        } else {
            String::new()
        };
        let mut entries = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, mv) = parse_record(line).ok_or_else(|| LookupError::Parse {
                path: path.clone(),
                line: idx + 1,
                record: line.to_string(),
            })?;
            entries.insert(key, mv);
        }
        info!("lookup {}: {} records", path.display(), entries.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        // Appends must start on a fresh line.
        if !content.is_empty() && !content.ends_with('\n') {
            writeln!(file).map_err(io_err)?;
        }

        Ok(Self {
            entries,
            file: Some((path, file)),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: u32) -> Option<Move> {
        self.entries.get(&key).copied()
    }

    /// Appends the record to the backing file before it becomes visible.
    pub fn insert(&mut self, key: u32, mv: Move) -> Result<(), LookupError> {
        if let Some((path, file)) = &mut self.file {
            writeln!(file, "{key}{SEPARATOR}{}", mv.mask()).map_err(|source| {
                LookupError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
        }
        self.entries.insert(key, mv);
        Ok(())
    }
}

fn parse_record(line: &str) -> Option<(u32, Move)> {
    let (key, mv) = line.trim().split_once(SEPARATOR)?;
    let key = key.trim().parse::<u32>().ok()?;
    let mask = mv.trim().parse::<u16>().ok()?;
    Some((key, Move::from_mask(mask)?))
}

/// Search engine with a best-move cache in front of it.
#[derive(Debug)]
pub struct LookupSearcher {
    searcher: AlphaBetaSearcher,
    cache: LookupCache,
    hits: u64,
    misses: u64,
}

impl LookupSearcher {
    pub fn new(searcher: AlphaBetaSearcher, cache: LookupCache) -> Self {
        Self {
            searcher,
            cache,
            hits: 0,
            misses: 0,
        }
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Cached move for `player` on the board, or a fresh search whose result
    /// is stored and persisted before it is returned. `Ok(None)` for decided
    /// boards.
    pub fn best_move(
        &mut self,
        board: &Board,
        player: Player,
    ) -> Result<Option<Move>, LookupError> {
        let key = board.encode_compact(player);
        if let Some(mv) = self.cache.get(key).filter(|mv| board.is_legal(*mv)) {
            self.hits += 1;
            return Ok(Some(mv));
        }

        self.misses += 1;
        let Some(mv) = self.searcher.search_with_info(board).best_move else {
            return Ok(None);
        };
        debug!("lookup miss for key {key}, stored cell {}", mv.cell());
        self.cache.insert(key, mv)?;
        Ok(Some(mv))
    }
}

impl MoveSource for LookupSearcher {
    /// A failed append aborts the game rather than returning an unsaved move.
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        match self.best_move(board, player) {
            Ok(mv) => mv,
            Err(err) => {
                log::error!("lookup cache: {err}");
                None
            }
        }
    }
}

/// Settings for [`bake`]: how many random opponents to play and how they
/// search.
#[derive(Debug, Clone, PartialEq)]
pub struct BakeConfig {
    pub players: usize,
    pub opponent: AlphaBetaConfig,
    pub architecture: Vec<usize>,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            players: 10,
            opponent: AlphaBetaConfig {
                depth: 3,
                threads: 1,
                power_save: false,
            },
            architecture: vec![CELL_COUNT, 8, 1],
        }
    }
}

#[derive(Debug, Error)]
pub enum BakeError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("bake game {game} failed: {source}")]
    Match { game: usize, source: MatchError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BakeStats {
    pub games: usize,
    pub records_before: usize,
    pub records_after: usize,
}

/// Grows the cache by playing it against `players` freshly randomised
/// network engines, each met once with the cache as X and once as O.
pub fn bake<R: Rng + ?Sized>(
    lookup: &mut LookupSearcher,
    config: &BakeConfig,
    rng: &mut R,
) -> Result<BakeStats, BakeError> {
    let records_before = lookup.cache().len();
    let mut games = 0;
    for player in 0..config.players {
        let network = Network::random(&config.architecture, rng)?;
        let eval = NetworkEval::new(Arc::new(network))?;
        let mut opponent = AlphaBetaSearcher::with_eval(config.opponent, Box::new(eval));

        let as_x = play_game(&mut *lookup, &mut opponent).map_err(|source| BakeError::Match {
            game: games,
            source,
        })?;
        let as_o = play_game(&mut opponent, &mut *lookup).map_err(|source| BakeError::Match {
            game: games + 1,
            source,
        })?;
        games += 2;
        debug!(
            "bake player {player}: {} as X, {} as O, {} records",
            as_x.result.as_str(),
            as_o.result.as_str(),
            lookup.cache().len()
        );
    }

    let stats = BakeStats {
        games,
        records_before,
        records_after: lookup.cache().len(),
    };
    info!(
        "baked {} games, lookup grew from {} to {} records",
        stats.games, stats.records_before, stats.records_after
    );
    Ok(stats)
}
