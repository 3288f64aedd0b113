//! Measuring how search cost grows with difficulty.
//!
//! Each extra hex zero should multiply the mean number of attempts by about
//! 16. [`sample_difficulty`] produces the numbers a driver would plot.

use powchain_core::{Difficulty, Transaction, ZeroPosition};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::error::{MinerError, Result};
use crate::search::{Miner, MiningOutcome};

/// Mean search cost at one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultySample {
    pub zeros: u32,
    pub trials: usize,
    pub mean_attempts: f64,
    /// 16^zeros
    pub expected_attempts: f64,
    pub mean_elapsed_ms: f64,
}

/// Mine `trials` distinct records at each level in `levels`.
///
/// Records are memo transactions that differ only in content, so every trial
/// is an independent search from nonce 0.
pub fn sample_difficulty(
    miner: &Miner,
    levels: impl IntoIterator<Item = u32>,
    position: ZeroPosition,
    trials: usize,
    cancel: &CancelToken,
) -> Result<Vec<DifficultySample>> {
    let mut samples = Vec::new();

    for zeros in levels {
        let difficulty = Difficulty::new(zeros, position)?;
        let mut attempts = 0u64;
        let mut elapsed_ms = 0f64;

        for trial in 0..trials {
            let record = Transaction::memo("sample", format!("trial {zeros}/{trial}"));
            match miner.search(&record, difficulty, cancel) {
                MiningOutcome::Mined { stats, .. } => {
                    attempts += stats.attempts;
                    elapsed_ms += stats.elapsed.as_secs_f64() * 1_000.0;
                }
                MiningOutcome::Stopped { reason, .. } => {
                    return Err(MinerError::Interrupted {
                        index: trial,
                        reason,
                    });
                }
            }
        }

        let n = trials.max(1) as f64;
        samples.push(DifficultySample {
            zeros,
            trials,
            mean_attempts: attempts as f64 / n,
            expected_attempts: difficulty.expected_attempts(),
            mean_elapsed_ms: elapsed_ms / n,
        });
    }

    Ok(samples)
}
