//! The Node: a miner working on a shared chain.
//!
//! A node turns pending transactions into blocks: it builds a candidate on
//! the current tip, mines it on a blocking task, and appends it. If another
//! node got there first the append fails with a link mismatch and the node
//! starts over from the new tip.

use std::time::Duration;

use powchain_core::{Block, Transaction};
use powchain_miner::{CancelToken, Miner, MiningOutcome, StopReason};
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use crate::chain::{now_millis, Chain};
use crate::config::ChainConfig;
use crate::error::{ChainError, Result};
use crate::shared::SharedChain;

/// A mining participant on a [`SharedChain`].
#[derive(Debug, Clone)]
pub struct Node {
    chain: SharedChain,
    miner: Miner,
    miner_id: String,
    config: ChainConfig,
}

impl Node {
    /// Join an existing chain. Rewards go to `config.miner_id`.
    pub fn new(chain: SharedChain, config: ChainConfig) -> Self {
        Self {
            chain,
            miner: Miner::new(config.miner.clone()),
            miner_id: config.miner_id.clone(),
            config,
        }
    }

    /// Start a fresh chain by mining its genesis block.
    pub async fn bootstrap(config: ChainConfig) -> Result<Self> {
        let empty = Chain::from_untrusted(Vec::new(), config.rules());
        let node = Self::new(SharedChain::new(empty), config);
        let genesis = node.mine_next(Vec::new()).await?;

        info!(hash = ?genesis.hash, miner = %node.miner_id, "bootstrapped chain");
        Ok(node)
    }

    /// Credit rewards to a different identity.
    pub fn with_miner_id(mut self, miner_id: impl Into<String>) -> Self {
        self.miner_id = miner_id.into();
        self
    }

    pub fn chain(&self) -> &SharedChain {
        &self.chain
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn miner_id(&self) -> &str {
        &self.miner_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mining
    // ─────────────────────────────────────────────────────────────────────────

    /// Mine `block` on a blocking task, paying this node's reward.
    ///
    /// Stops early if `cancel` fires; the stop is reported as
    /// [`ChainError::MiningStopped`].
    pub async fn mine_block(&self, block: Block, cancel: &CancelToken) -> Result<Block> {
        joined(self.spawn_search(block, cancel.clone()).await)
    }

    /// Mine `block`, giving up after `limit`.
    ///
    /// On expiry the search's workers are told to stop and the task is
    /// awaited, so no threads are left running. A solution that arrives in
    /// that window is still returned.
    pub async fn mine_block_within(&self, block: Block, limit: Duration) -> Result<Block> {
        let cancel = CancelToken::new();
        let mut handle = self.spawn_search(block, cancel.clone());

        match tokio::time::timeout(limit, &mut handle).await {
            Ok(result) => joined(result),
            Err(_) => {
                warn!(miner = %self.miner_id, ?limit, "mining deadline passed, cancelling");
                cancel.cancel();
                match joined(handle.await) {
                    Err(ChainError::MiningStopped(StopReason::Cancelled)) => {
                        Err(ChainError::MiningStopped(StopReason::TimedOut))
                    }
                    other => other,
                }
            }
        }
    }

    /// Mine `transactions` into the next block and append it.
    pub async fn mine_next(&self, transactions: Vec<Transaction>) -> Result<Block> {
        self.mine_next_with(transactions, &CancelToken::new()).await
    }

    /// Like [`Node::mine_next`], with external cancellation.
    ///
    /// Losing an append race rebuilds the block on the new tip, up to
    /// `max_append_retries` times. The last mismatch is returned once the
    /// retries run out.
    pub async fn mine_next_with(
        &self,
        transactions: Vec<Transaction>,
        cancel: &CancelToken,
    ) -> Result<Block> {
        let mut retries = 0;

        loop {
            let mut block = self.chain.next_block(now_millis())?;
            for tx in &transactions {
                block.push_transaction(tx.clone())?;
            }

            let mined = self.mine_block(block, cancel).await?;
            match self.chain.try_append(mined.clone()) {
                Ok(index) => {
                    info!(index, miner = %self.miner_id, retries, "mined and appended block");
                    return Ok(mined);
                }
                Err(err) if err.is_link_race() && retries < self.config.max_append_retries => {
                    retries += 1;
                    warn!(miner = %self.miner_id, retries, "lost append race, rebuilding on new tip");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn spawn_search(&self, mut block: Block, cancel: CancelToken) -> JoinHandle<Result<Block>> {
        let miner = self.miner.clone();
        let miner_id = self.miner_id.clone();
        let reward = self.config.block_reward;

        tokio::task::spawn_blocking(move || {
            match miner.mine_block(&mut block, &miner_id, reward, &cancel)? {
                MiningOutcome::Mined { .. } => Ok(block),
                MiningOutcome::Stopped { reason, .. } => Err(ChainError::MiningStopped(reason)),
            }
        })
    }
}

fn joined(result: std::result::Result<Result<Block>, JoinError>) -> Result<Block> {
    result.map_err(|e| ChainError::MiningTask(e.to_string()))?
}
