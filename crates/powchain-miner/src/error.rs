//! Error types for the miner.

use powchain_core::{CoreError, Difficulty};
use thiserror::Error;

use crate::search::StopReason;

/// Errors that can occur while mining.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinerError {
    /// The record already carries a digest; re-mining would change it.
    #[error("record is already sealed")]
    AlreadySealed,

    /// The record commits to its own difficulty and a different one was asked for.
    #[error("record commits to difficulty {recorded}, search requested {requested}")]
    DifficultyMismatch {
        requested: Difficulty,
        recorded: Difficulty,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A multi-record job stopped before every record was mined.
    #[error("mining stopped at record {index}: {reason}")]
    Interrupted { index: usize, reason: StopReason },
}

/// Result type for miner operations.
pub type Result<T> = std::result::Result<T, MinerError>;
