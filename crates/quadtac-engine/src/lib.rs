pub mod alphabeta;
pub mod evolution;
pub mod heuristic;
pub mod lookup;
pub mod network;
pub mod network_eval;
pub mod network_format;
pub mod population_format;
pub mod score;
pub mod selfplay;

pub use alphabeta::{
    partition_moves, AlphaBetaConfig, AlphaBetaResult, AlphaBetaSearcher, MAX_DEPTH,
};
pub use evolution::{
    EvolutionConfig, EvolutionError, EvolutionTrainer, GenerationStats, Member, Pairing,
    PlayedGame, TrainerState,
};
pub use heuristic::HeuristicEval;
pub use lookup::{
    bake, BakeConfig, BakeError, BakeStats, LookupCache, LookupError, LookupSearcher,
};
pub use network::{Layer, Network, NetworkError};
pub use network_eval::{NetworkEval, NETWORK_SCALE};
pub use network_format::{network_from_bytes, network_to_bytes, FormatError};
pub use population_format::PopulationSnapshot;
pub use score::{
    format_score, is_win_score, terminal_score, win_in_n, SCORE_INFINITY, WIN_SCORE,
};
pub use selfplay::{play_from, play_game, GameRecord, GameResult, MatchError};
