//! Error types for powchain core.

use thiserror::Error;

use crate::crypto::Fingerprint;
use crate::difficulty::Difficulty;

/// Errors raised by record construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("previous block has not been mined")]
    PreviousBlockNotMined,

    #[error("invalid difficulty: {requested} zero characters requested, digest has {max}")]
    InvalidDifficulty { requested: u32, max: usize },

    #[error("record is already sealed")]
    AlreadySealed,

    /// Only mining mints transfers from the network address.
    #[error("transfers from {0:?} are reserved for block rewards")]
    ReservedSender(String),
}

/// Reasons a sealed record fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record has no hash")]
    MissingHash,

    #[error("transaction has no signature")]
    MissingSignature,

    #[error("stored hash {stored} does not match recomputed {computed}")]
    HashMismatch {
        stored: Fingerprint,
        computed: Fingerprint,
    },

    #[error("stored signature {stored} does not match recomputed {computed}")]
    SignatureMismatch {
        stored: Fingerprint,
        computed: Fingerprint,
    },

    #[error("hash {hash} does not satisfy {difficulty}")]
    InsufficientWork {
        hash: Fingerprint,
        difficulty: Difficulty,
    },

    #[error("recorded difficulty {recorded} is below the required {required}")]
    BelowMinimumDifficulty {
        recorded: Difficulty,
        required: Difficulty,
    },

    #[error("genesis block points at a predecessor {0}")]
    GenesisHasPredecessor(Fingerprint),

    #[error("broken link: expected previous {expected:?}, got {got:?}")]
    BrokenLink {
        expected: Option<Fingerprint>,
        got: Option<Fingerprint>,
    },

    #[error("block has no reward transaction")]
    RewardMissing,

    #[error("invalid reward: {0}")]
    RewardInvalid(String),
}

/// A validation failure pinned to a position in a sequence or chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {index} failed validation: {reason}")]
pub struct ValidationFailure {
    /// Index of the first record that failed.
    pub index: usize,
    /// Why it failed.
    pub reason: ValidationError,
}

impl ValidationFailure {
    pub fn new(index: usize, reason: ValidationError) -> Self {
        Self { index, reason }
    }
}
