//! # powchain miner
//!
//! Proof-of-work search over [`Mineable`](powchain_core::Mineable) records.
//!
//! ## Overview
//!
//! - [`Miner`] - Brute-force nonce search, optionally across worker threads
//! - [`CancelToken`] - Cooperative cancellation checked on every attempt
//! - [`MiningOutcome`] - Explicit result: mined, or stopped with a reason
//!
//! A search never hangs silently: it ends with a solution, or with
//! [`StopReason::Cancelled`], [`StopReason::TimedOut`],
//! [`StopReason::AttemptLimit`] or [`StopReason::Exhausted`].
//!
//! ## Usage
//!
//! ```rust
//! use powchain_core::{genesis, Difficulty};
//! use powchain_miner::{CancelToken, Miner, MinerConfig};
//!
//! let mut block = genesis(0, Difficulty::leading(2).unwrap());
//! let miner = Miner::new(MinerConfig::default());
//! let outcome = miner
//!     .mine_block(&mut block, "tim", 1, &CancelToken::new())
//!     .unwrap();
//! assert!(outcome.is_mined());
//! assert!(block.hash.unwrap().to_hex().starts_with("00"));
//! ```

pub mod block;
pub mod cancel;
pub mod config;
pub mod error;
pub mod sampling;
pub mod search;
pub mod sequence;

pub use cancel::CancelToken;
pub use config::MinerConfig;
pub use error::{MinerError, Result};
pub use sampling::{sample_difficulty, DifficultySample};
pub use search::{Miner, MiningOutcome, MiningStats, Solution, StopReason};
pub use sequence::verify_mined_sequence;

use powchain_core::{Difficulty, Mineable};

/// Mine `record` with the default miner and no external cancellation.
///
/// A block is paid to [`DEFAULT_MINER`](powchain_core::DEFAULT_MINER) before
/// the search and must be mined at its recorded difficulty. Anything that
/// needs a deadline should build a [`Miner`] with a time limit or pass its
/// own [`CancelToken`].
pub fn mine<R: Mineable + Sync>(record: &mut R, difficulty: Difficulty) -> Result<MiningOutcome> {
    Miner::default().mine(record, difficulty, &CancelToken::new())
}
