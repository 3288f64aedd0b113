//! Mining blocks: pay the miner, then search.

use powchain_core::Block;
use tracing::info;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::search::{Miner, MiningOutcome};

impl Miner {
    /// Mine `block` on behalf of `miner_id`.
    ///
    /// The reward transaction is appended before the first hash and the
    /// transaction list is not touched again during the search. The block is
    /// mined against its own recorded difficulty.
    pub fn mine_block(
        &self,
        block: &mut Block,
        miner_id: &str,
        reward: u64,
        cancel: &CancelToken,
    ) -> Result<MiningOutcome> {
        let difficulty = block.difficulty;
        let outcome = self.mine_for(block, difficulty, miner_id, reward, cancel)?;

        if let (Some(hash), MiningOutcome::Mined { stats, .. }) = (block.hash, &outcome) {
            info!(
                miner = miner_id,
                hash = %hash,
                nonce = block.nonce,
                transactions = block.transactions.len(),
                attempts = stats.attempts,
                "mined block"
            );
        }
        Ok(outcome)
    }
}
