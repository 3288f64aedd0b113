//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: cheap difficulties, mined
//! blocks and small chains.

use powchain::{Chain, ChainConfig};
use powchain_core::{genesis, new_block, Block, BlockRules, Difficulty, Transaction};
use powchain_miner::{CancelToken, Miner, MinerConfig, MiningOutcome};
use tracing_subscriber::EnvFilter;

pub use powchain::now_millis;

/// Route `tracing` output through the test harness.
///
/// Filtered by `RUST_LOG`, defaulting to `warn`. Safe to call from every
/// test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A miner and rules cheap enough to mine blocks inside unit tests.
pub struct ChainFixture {
    pub config: ChainConfig,
    pub miner: Miner,
}

impl ChainFixture {
    /// One leading zero, single-threaded.
    pub fn new() -> Self {
        Self::with_difficulty(Difficulty::leading(1).expect("valid difficulty"))
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        let config = ChainConfig::default()
            .with_difficulty(difficulty)
            .with_miner(MinerConfig::single_threaded())
            .with_miner_id("tim");
        Self {
            miner: Miner::new(config.miner.clone()),
            config,
        }
    }

    pub fn rules(&self) -> BlockRules {
        self.config.rules()
    }

    /// Mine `block` for `miner_id`, panicking if the search stops.
    pub fn mine(&self, block: &mut Block, miner_id: &str) {
        let outcome = self
            .miner
            .mine_block(block, miner_id, self.config.block_reward, &CancelToken::new())
            .expect("mining failed");
        assert!(
            matches!(outcome, MiningOutcome::Mined { .. }),
            "search stopped: {outcome:?}"
        );
    }

    /// A mined genesis block.
    pub fn mined_genesis(&self, timestamp: i64) -> Block {
        let mut block = genesis(timestamp, self.config.difficulty);
        self.mine(&mut block, &self.config.miner_id);
        block
    }

    /// A mined successor of `previous` carrying `transactions`.
    pub fn mined_block(
        &self,
        previous: &Block,
        timestamp: i64,
        transactions: Vec<Transaction>,
        miner_id: &str,
    ) -> Block {
        let mut block = new_block(previous, timestamp).expect("previous block is not mined");
        for tx in transactions {
            block.push_transaction(tx).expect("block is already mined");
        }
        self.mine(&mut block, miner_id);
        block
    }

    /// A valid chain of `len` blocks (at least the genesis block).
    ///
    /// Block `i` carries one transfer and is mined at timestamp `1_000 * (i + 1)`.
    pub fn chain(&self, len: usize) -> Chain {
        let first = self.mined_genesis(1_000);
        let mut chain = Chain::new(first, self.rules()).expect("genesis rejected");

        for i in 1..len {
            let tip = chain.tip().cloned().expect("chain has a genesis block");
            let transfer = Transaction::transfer("A's address", "B's address", i as u64);
            let block = self.mined_block(&tip, 1_000 * (i as i64 + 1), vec![transfer], "joel");
            chain.append(block).expect("append rejected");
        }
        chain
    }
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Configurations for several nodes mining the same chain.
pub fn multi_node_configs(count: usize) -> Vec<ChainConfig> {
    let base = ChainFixture::new().config;
    (0..count)
        .map(|i| base.clone().with_miner_id(format!("node-{i}")))
        .collect()
}
