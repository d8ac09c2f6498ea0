use std::sync::Arc;

use quadtac_core::{Board, Evaluator, Player, Score, CELL_COUNT};

use crate::network::{Network, NetworkError};
use crate::network_format::{network_from_bytes, FormatError};
use crate::score::terminal_score;

/// Multiplier from the `tanh` output in [-1, 1] to an integer score.
pub const NETWORK_SCALE: f64 = 1_000.0;

/// Scores undecided boards with a network fed `board.encode(player)`.
///
/// Decided boards bypass the network and use the shared terminal score.
#[derive(Debug, Clone)]
pub struct NetworkEval {
    network: Arc<Network>,
}

impl NetworkEval {
    pub fn new(network: Arc<Network>) -> Result<Self, NetworkError> {
        if network.input_len() != CELL_COUNT {
            return Err(NetworkError::InputLength {
                expected: CELL_COUNT,
                found: network.input_len(),
            });
        }
        Ok(Self { network })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let network = network_from_bytes(data)?;
        Ok(Self::new(Arc::new(network))?)
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    pub fn raw_output(&self, board: &Board, player: Player) -> f64 {
        self.network.forward(&board.encode(player))[0]
    }
}

impl Evaluator for NetworkEval {
    fn evaluate(&self, board: &Board, player: Player) -> Score {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        Score((self.raw_output(board, player) * NETWORK_SCALE).round() as i32)
    }
}
