//! Error types for the chain facade.

use powchain_core::{CoreError, Difficulty, Fingerprint, ValidationError, ValidationFailure};
use powchain_miner::{MinerError, StopReason};
use thiserror::Error;

/// Errors that can occur during chain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A successor was requested for a block that has no hash yet.
    #[error("previous block has not been mined")]
    PreviousBlockNotMined,

    #[error("invalid difficulty: {requested} zero characters requested, digest has {max}")]
    InvalidDifficulty { requested: u32, max: usize },

    /// The block does not extend the current tip. Recoverable by rebuilding
    /// on the new tip.
    #[error("chain link mismatch: expected previous hash {expected:?}, got {got:?}")]
    ChainLinkMismatch {
        expected: Option<Fingerprint>,
        got: Option<Fingerprint>,
    },

    /// The first block at `index` that failed verification.
    #[error("validation failed at block {index}: {reason}")]
    ValidationFailed {
        index: usize,
        reason: ValidationError,
    },

    /// Transfers from the network address are minted by mining only.
    #[error("transfers from {0:?} are reserved for block rewards")]
    ReservedSender(String),

    /// The block commits to a different target than the one requested.
    #[error("block records difficulty {recorded}, mining requested {requested}")]
    DifficultyMismatch {
        requested: Difficulty,
        recorded: Difficulty,
    },

    /// The block already carries a hash and cannot be mined again.
    #[error("block is already mined")]
    AlreadyMined,

    /// A search ended without a solution.
    #[error("mining stopped: {0}")]
    MiningStopped(StopReason),

    /// A multi-record mining job stopped part way through.
    #[error("mining stopped at record {index}: {reason}")]
    MiningInterrupted { index: usize, reason: StopReason },

    /// The blocking mining task panicked or was aborted.
    #[error("mining task failed: {0}")]
    MiningTask(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ChainError {
    /// Whether retrying against a fresh tip can succeed.
    pub fn is_link_race(&self) -> bool {
        matches!(self, ChainError::ChainLinkMismatch { .. })
    }
}

impl From<CoreError> for ChainError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PreviousBlockNotMined => ChainError::PreviousBlockNotMined,
            CoreError::InvalidDifficulty { requested, max } => {
                ChainError::InvalidDifficulty { requested, max }
            }
            CoreError::AlreadySealed => ChainError::AlreadyMined,
            CoreError::ReservedSender(address) => ChainError::ReservedSender(address),
        }
    }
}

impl From<ValidationFailure> for ChainError {
    fn from(failure: ValidationFailure) -> Self {
        ChainError::ValidationFailed {
            index: failure.index,
            reason: failure.reason,
        }
    }
}

impl From<MinerError> for ChainError {
    fn from(err: MinerError) -> Self {
        match err {
            MinerError::AlreadySealed => ChainError::AlreadyMined,
            MinerError::Core(core) => core.into(),
            MinerError::Interrupted { index, reason } => {
                ChainError::MiningInterrupted { index, reason }
            }
            MinerError::DifficultyMismatch {
                requested,
                recorded,
            } => ChainError::DifficultyMismatch {
                requested,
                recorded,
            },
        }
    }
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_flatten() {
        assert_eq!(
            ChainError::from(CoreError::PreviousBlockNotMined),
            ChainError::PreviousBlockNotMined
        );
        assert_eq!(
            ChainError::from(MinerError::Core(CoreError::InvalidDifficulty {
                requested: 65,
                max: 64
            })),
            ChainError::InvalidDifficulty {
                requested: 65,
                max: 64
            }
        );
        assert_eq!(
            ChainError::from(MinerError::AlreadySealed),
            ChainError::AlreadyMined
        );
    }

    #[test]
    fn test_reserved_sender_flattens() {
        assert_eq!(
            ChainError::from(MinerError::Core(CoreError::ReservedSender("network".into()))),
            ChainError::ReservedSender("network".into())
        );
    }

    #[test]
    fn test_validation_failure_keeps_index() {
        let err = ChainError::from(ValidationFailure::new(3, ValidationError::MissingHash));
        assert_eq!(
            err,
            ChainError::ValidationFailed {
                index: 3,
                reason: ValidationError::MissingHash
            }
        );
        assert_eq!(
            err.to_string(),
            "validation failed at block 3: record has no hash"
        );
    }

    #[test]
    fn test_link_race() {
        let err = ChainError::ChainLinkMismatch {
            expected: None,
            got: Some(Fingerprint::of(b"x")),
        };
        assert!(err.is_link_race());
        assert!(!ChainError::AlreadyMined.is_link_race());
    }
}
