//! The Chain: an owned, append-only sequence of mined blocks.
//!
//! A chain owns its blocks and hands them out read-only. It grows only
//! through [`Chain::append`], which checks the new block against the current
//! tip, and it can be re-verified end to end at any time with
//! [`Chain::validate`] or [`Chain::audit`].

use powchain_core::{
    genesis, new_block, validate_block, validate_link, validate_seal, Block, BlockRules,
    Fingerprint, ValidationError,
};
use tracing::{debug, info, warn};

use crate::error::{ChainError, Result};

/// One problem found by [`Chain::audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFault {
    pub index: usize,
    pub reason: ValidationError,
}

/// An append-only chain of mined blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    blocks: Vec<Block>,
    rules: BlockRules,
}

impl Chain {
    /// Start a chain from a mined genesis block.
    ///
    /// The genesis block is held to the same rules as every later block.
    pub fn new(genesis: Block, rules: BlockRules) -> Result<Self> {
        if let Err(reason) = validate_block(&genesis, None, &rules) {
            warn!(%reason, "rejected genesis block");
            return Err(ChainError::ValidationFailed { index: 0, reason });
        }

        info!(hash = ?genesis.hash, difficulty = %genesis.difficulty, "chain started");
        Ok(Self {
            blocks: vec![genesis],
            rules,
        })
    }

    /// Load blocks from an untrusted source and verify all of them.
    pub fn from_blocks(blocks: Vec<Block>, rules: BlockRules) -> Result<Self> {
        let chain = Self::from_untrusted(blocks, rules);
        chain.validate()?;
        Ok(chain)
    }

    /// Wrap blocks without checking them.
    ///
    /// Useful for inspecting a damaged chain with [`Chain::audit`]; nothing
    /// built on top should trust it until [`Chain::validate`] passes.
    pub fn from_untrusted(blocks: Vec<Block>, rules: BlockRules) -> Self {
        Self { blocks, rules }
    }

    pub fn rules(&self) -> &BlockRules {
        &self.rules
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// The most recently appended block.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Hash a new block must link to. `None` on an empty chain.
    pub fn tip_hash(&self) -> Option<Fingerprint> {
        self.tip().and_then(|block| block.hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Growth
    // ─────────────────────────────────────────────────────────────────────────

    /// An empty candidate block on top of the current tip.
    ///
    /// On an empty chain this is a genesis block at the minimum difficulty.
    pub fn next_block(&self, timestamp: i64) -> Result<Block> {
        match self.tip() {
            Some(tip) => Ok(new_block(tip, timestamp)?),
            None => Ok(genesis(timestamp, self.rules.minimum_difficulty)),
        }
    }

    /// Append a mined block.
    ///
    /// Fails with [`ChainError::ChainLinkMismatch`] if the block does not
    /// point at the current tip, which is what a lost race looks like. A
    /// block that links correctly but whose seal does not hold up fails with
    /// [`ChainError::ValidationFailed`] at the index it would have taken.
    pub fn append(&mut self, block: Block) -> Result<()> {
        let expected = self.tip_hash();
        if block.previous_hash != expected {
            debug!(?expected, got = ?block.previous_hash, "block does not extend tip");
            return Err(ChainError::ChainLinkMismatch {
                expected,
                got: block.previous_hash,
            });
        }

        let index = self.blocks.len();
        if let Err(reason) = validate_seal(&block, &self.rules) {
            warn!(index, %reason, "rejected block");
            return Err(ChainError::ValidationFailed { index, reason });
        }

        info!(
            index,
            hash = ?block.hash,
            transactions = block.transactions.len(),
            "appended block"
        );
        self.blocks.push(block);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Recompute every block and report the first one that fails.
    ///
    /// For each block, genesis included: the stored hash must equal the
    /// recomputed one, it must carry the recorded work, the recorded
    /// difficulty must meet the chain's minimum, the reward must be in order,
    /// and `previous_hash` must equal the predecessor's recomputed hash.
    pub fn validate(&self) -> Result<()> {
        let mut previous = None;
        for (index, block) in self.blocks.iter().enumerate() {
            if let Err(reason) = validate_block(block, previous, &self.rules) {
                warn!(index, %reason, "chain failed validation");
                return Err(ChainError::ValidationFailed { index, reason });
            }
            previous = Some(block);
        }

        debug!(blocks = self.blocks.len(), "chain validated");
        Ok(())
    }

    /// Walk the whole chain and collect every fault instead of stopping at
    /// the first.
    ///
    /// Tampering with block `i` shows up twice: as a bad seal at `i` and as
    /// a broken link at `i + 1`, since block `i`'s real hash no longer
    /// matches what its successor recorded.
    pub fn audit(&self) -> Vec<BlockFault> {
        let mut faults = Vec::new();
        let mut previous = None;

        for (index, block) in self.blocks.iter().enumerate() {
            if let Err(reason) = validate_seal(block, &self.rules) {
                faults.push(BlockFault { index, reason });
            }
            if let Err(reason) = validate_link(block, previous) {
                faults.push(BlockFault { index, reason });
            }
            previous = Some(block);
        }

        if !faults.is_empty() {
            warn!(faults = faults.len(), "chain audit found faults");
        }
        faults
    }
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_core::{Difficulty, Payload, Transaction};
    use powchain_miner::{CancelToken, Miner, MinerConfig};

    fn rules() -> BlockRules {
        BlockRules {
            minimum_difficulty: Difficulty::leading(1).unwrap(),
            block_reward: 1,
        }
    }

    fn mine(block: &mut Block, miner_id: &str) {
        let outcome = Miner::new(MinerConfig::single_threaded())
            .mine_block(block, miner_id, 1, &CancelToken::new())
            .unwrap();
        assert!(outcome.is_mined());
    }

    fn two_block_chain() -> Chain {
        let mut first = genesis(1_000, Difficulty::leading(1).unwrap());
        mine(&mut first, "tim");
        let mut chain = Chain::new(first, rules()).unwrap();

        let mut second = chain.next_block(2_000).unwrap();
        second
            .push_transaction(Transaction::transfer("A's address", "B's address", 10))
            .unwrap();
        mine(&mut second, "joel");
        chain.append(second).unwrap();
        chain
    }

    #[test]
    fn test_genesis_only_chain_validates() {
        let mut first = genesis(1_000, Difficulty::leading(1).unwrap());
        mine(&mut first, "tim");
        let chain = Chain::new(first, rules()).unwrap();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.tip().unwrap().previous_hash, None);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_unmined_genesis_rejected() {
        let first = genesis(1_000, Difficulty::leading(1).unwrap());
        assert_eq!(
            Chain::new(first, rules()),
            Err(ChainError::ValidationFailed {
                index: 0,
                reason: ValidationError::MissingHash
            })
        );
    }

    #[test]
    fn test_append_and_validate() {
        let chain = two_block_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.blocks()[1].previous_hash, chain.blocks()[0].hash);
        assert!(chain.validate().is_ok());
        assert!(chain.audit().is_empty());
    }

    #[test]
    fn test_append_rejects_stale_block() {
        let mut chain = two_block_chain();

        // Built on genesis, but the tip has moved on.
        let mut stale = new_block(&chain.blocks()[0], 3_000).unwrap();
        mine(&mut stale, "kevin");

        let err = chain.append(stale).unwrap_err();
        assert!(err.is_link_race());
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_append_rejects_forged_hash() {
        let mut chain = two_block_chain();
        let mut forged = chain.next_block(3_000).unwrap();
        forged.set_reward("kevin", 1).unwrap();
        forged.hash = Some(Fingerprint::of(b"not a proof"));

        assert!(matches!(
            chain.append(forged),
            Err(ChainError::ValidationFailed {
                index: 2,
                reason: ValidationError::HashMismatch { .. }
            })
        ));
    }

    #[test]
    fn test_tampered_first_block_fails_at_zero() {
        let mut blocks = two_block_chain().into_blocks();
        blocks[0].timestamp += 1;
        let chain = Chain::from_untrusted(blocks, rules());

        assert!(matches!(
            chain.validate(),
            Err(ChainError::ValidationFailed { index: 0, .. })
        ));
    }

    #[test]
    fn test_audit_shows_broken_successor_link() {
        let mut blocks = two_block_chain().into_blocks();
        blocks[0].transactions[0].payload = Payload::Transfer {
            from: "network".into(),
            to: "mallory".into(),
            amount: 1,
        };
        let chain = Chain::from_untrusted(blocks, rules());

        let faults = chain.audit();
        let indices: Vec<usize> = faults.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert!(matches!(faults[0].reason, ValidationError::HashMismatch { .. }));
        assert!(matches!(faults[1].reason, ValidationError::BrokenLink { .. }));
    }

    #[test]
    fn test_from_blocks_validates() {
        let blocks = two_block_chain().into_blocks();
        assert!(Chain::from_blocks(blocks.clone(), rules()).is_ok());

        let strict = BlockRules {
            minimum_difficulty: Difficulty::leading(8).unwrap(),
            block_reward: 1,
        };
        assert!(matches!(
            Chain::from_blocks(blocks, strict),
            Err(ChainError::ValidationFailed {
                index: 0,
                reason: ValidationError::BelowMinimumDifficulty { .. }
            })
        ));
    }

    #[test]
    fn test_empty_chain_accepts_genesis() {
        let mut chain = Chain::from_untrusted(Vec::new(), rules());
        assert!(chain.validate().is_ok());

        let mut first = chain.next_block(1_000).unwrap();
        assert!(first.is_genesis());
        mine(&mut first, "tim");
        chain.append(first).unwrap();
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_next_block_on_unmined_tip() {
        let chain = Chain::from_untrusted(
            vec![genesis(1_000, Difficulty::leading(1).unwrap())],
            rules(),
        );
        assert_eq!(chain.next_block(2_000), Err(ChainError::PreviousBlockNotMined));
    }
}
