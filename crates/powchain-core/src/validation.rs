//! Block validation: proof-of-work, linkage and reward checks.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BLOCK_REWARD};
use crate::difficulty::Difficulty;
use crate::error::ValidationError;
use crate::transaction::Payload;

/// Rules a block must satisfy beyond its own recorded difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRules {
    /// The weakest target a block may have been mined against.
    pub minimum_difficulty: Difficulty,
    /// The exact reward every block must pay.
    pub block_reward: u64,
}

impl Default for BlockRules {
    fn default() -> Self {
        Self {
            minimum_difficulty: Difficulty::default(),
            block_reward: BLOCK_REWARD,
        }
    }
}

/// Validate a block in its chain position.
///
/// `previous` is `None` for the genesis position.
pub fn validate_block(
    block: &Block,
    previous: Option<&Block>,
    rules: &BlockRules,
) -> Result<(), ValidationError> {
    validate_seal(block, rules)?;
    validate_link(block, previous)
}

/// Check a block on its own: hash, work and reward.
///
/// This performs:
/// - Hash presence
/// - Hash recomputation over the canonical bytes
/// - Recorded difficulty against the hash
/// - Recorded difficulty against the rules' minimum
/// - Reward structure
pub fn validate_seal(block: &Block, rules: &BlockRules) -> Result<(), ValidationError> {
    // 1. Must have been mined
    let stored = block.hash.ok_or(ValidationError::MissingHash)?;

    // 2. Hash must match content
    let computed = block.compute_hash();
    if computed != stored {
        return Err(ValidationError::HashMismatch { stored, computed });
    }

    // 3. Hash must carry the recorded work
    if !block.difficulty.is_satisfied_by(&stored) {
        return Err(ValidationError::InsufficientWork {
            hash: stored,
            difficulty: block.difficulty,
        });
    }

    // 4. Recorded work must meet the chain's floor
    if !block.difficulty.meets(&rules.minimum_difficulty) {
        return Err(ValidationError::BelowMinimumDifficulty {
            recorded: block.difficulty,
            required: rules.minimum_difficulty,
        });
    }

    // 5. Exactly one reward, last, of the configured amount
    validate_reward(block, rules.block_reward)
}

/// Check that `block` points at `previous`.
///
/// The link is compared against the previous block's *recomputed* hash, so a
/// tampered predecessor breaks this block's link even though this block was
/// never touched.
pub fn validate_link(block: &Block, previous: Option<&Block>) -> Result<(), ValidationError> {
    if let (None, Some(hash)) = (previous, block.previous_hash) {
        return Err(ValidationError::GenesisHasPredecessor(hash));
    }
    let expected = previous.map(Block::compute_hash);
    if block.previous_hash != expected {
        return Err(ValidationError::BrokenLink {
            expected,
            got: block.previous_hash,
        });
    }
    Ok(())
}

fn validate_reward(block: &Block, amount: u64) -> Result<(), ValidationError> {
    let rewards = block.transactions.iter().filter(|tx| tx.is_reward()).count();
    if rewards == 0 {
        return Err(ValidationError::RewardMissing);
    }
    if rewards > 1 {
        return Err(ValidationError::RewardInvalid(format!(
            "{rewards} reward transactions"
        )));
    }

    let reward = block
        .reward()
        .ok_or_else(|| ValidationError::RewardInvalid("reward is not the last transaction".into()))?;

    match &reward.payload {
        Payload::Transfer { amount: paid, .. } if *paid == amount => Ok(()),
        Payload::Transfer { amount: paid, .. } => Err(ValidationError::RewardInvalid(format!(
            "reward pays {paid}, expected {amount}"
        ))),
        Payload::Memo { .. } => Err(ValidationError::RewardInvalid("reward is not a transfer".into())),
    }
}
