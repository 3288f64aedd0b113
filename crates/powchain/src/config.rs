//! Chain configuration.

use powchain_core::{BlockRules, Difficulty, BLOCK_REWARD, DEFAULT_MINER};
use powchain_miner::MinerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// Configuration for a [`Chain`](crate::Chain) and the nodes mining on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Difficulty for new genesis blocks, and the minimum every block must
    /// have been mined against.
    pub difficulty: Difficulty,

    /// Exact reward every block pays its miner.
    pub block_reward: u64,

    /// Identity credited by the reward when a caller does not name one.
    pub miner_id: String,

    /// Search settings.
    pub miner: MinerConfig,

    /// How many times a node rebuilds on a fresh tip after losing an append
    /// race before giving up.
    pub max_append_retries: usize,
}

impl ChainConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ChainError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ChainError::InvalidConfig(e.to_string()))
    }

    /// The per-block rules this configuration implies.
    pub fn rules(&self) -> BlockRules {
        BlockRules {
            minimum_difficulty: self.difficulty,
            block_reward: self.block_reward,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_miner(mut self, miner: MinerConfig) -> Self {
        self.miner = miner;
        self
    }

    pub fn with_miner_id(mut self, miner_id: impl Into<String>) -> Self {
        self.miner_id = miner_id.into();
        self
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            block_reward: BLOCK_REWARD,
            miner_id: DEFAULT_MINER.to_string(),
            miner: MinerConfig::default(),
            max_append_retries: 8,
        }
    }
}
