//! Miner configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`Miner`](crate::Miner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Worker threads searching disjoint nonce ranges.
    pub workers: usize,

    /// Attempts between deadline and attempt-limit checks.
    /// Cancellation is checked on every attempt regardless.
    pub check_interval: u64,

    /// Give up after this many milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Give up after this many attempts across all workers.
    pub max_attempts: Option<u64>,

    /// Start from a random nonce instead of the record's stored one.
    pub randomize_start: bool,
}

impl MinerConfig {
    /// A single-threaded configuration. Attempt counts are then exact, which
    /// is what difficulty sampling wants.
    pub fn single_threaded() -> Self {
        Self {
            workers: 1,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            check_interval: 1024,
            time_limit_ms: None,
            max_attempts: None,
            randomize_start: false,
        }
    }
}
