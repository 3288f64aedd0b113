//! Blocks: batches of transactions sealed by proof-of-work.
//!
//! A block links to its predecessor through `previous_hash`. Its own `hash`
//! stays empty until a mining search over the block's canonical bytes finds
//! one that satisfies the block's difficulty.

use serde::{Deserialize, Serialize};

use crate::canonical::{block_bytes_with_nonce, canonical_block_bytes};
use crate::crypto::Fingerprint;
use crate::difficulty::Difficulty;
use crate::error::CoreError;
use crate::mineable::Mineable;
use crate::transaction::{Transaction, NETWORK_ADDRESS};

/// Default reward paid to the miner of each block.
pub const BLOCK_REWARD: u64 = 1;

/// Payee used when a block is mined without naming a miner.
pub const DEFAULT_MINER: &str = "miner";

/// A block of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Creation time (Unix milliseconds).
    pub timestamp: i64,

    pub transactions: Vec<Transaction>,

    pub nonce: u64,

    /// Target the block was mined against. Part of the hashed bytes, so it
    /// cannot be lowered after the fact.
    pub difficulty: Difficulty,

    /// Hash of the previous block (`None` for genesis).
    pub previous_hash: Option<Fingerprint>,

    /// Proof-of-work hash (`None` until mined).
    pub hash: Option<Fingerprint>,
}

/// The first block of a chain, ready to be mined.
pub fn genesis(timestamp: i64, difficulty: Difficulty) -> Block {
    Block {
        timestamp,
        transactions: Vec::new(),
        nonce: 0,
        difficulty,
        previous_hash: None,
        hash: None,
    }
}

/// An empty block on top of `previous`, inheriting its difficulty.
///
/// Fails if `previous` has not been mined: there is no hash to link to yet.
pub fn new_block(previous: &Block, timestamp: i64) -> Result<Block, CoreError> {
    let previous_hash = previous.hash.ok_or(CoreError::PreviousBlockNotMined)?;
    Ok(Block {
        timestamp,
        transactions: Vec::new(),
        nonce: 0,
        difficulty: previous.difficulty,
        previous_hash: Some(previous_hash),
        hash: None,
    })
}

impl Block {
    pub fn is_mined(&self) -> bool {
        self.hash.is_some()
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_none()
    }

    /// Override the difficulty before mining.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Fingerprint of the block's canonical bytes.
    pub fn compute_hash(&self) -> Fingerprint {
        Fingerprint::of(&canonical_block_bytes(self))
    }

    /// Add a transaction. Mined blocks are frozen.
    ///
    /// Rewards are minted by [`Block::set_reward`] only, so transfers from
    /// the network address are refused here.
    pub fn push_transaction(&mut self, tx: Transaction) -> Result<(), CoreError> {
        if self.is_mined() {
            return Err(CoreError::AlreadySealed);
        }
        if tx.is_reward() {
            return Err(CoreError::ReservedSender(NETWORK_ADDRESS.to_string()));
        }
        self.transactions.push(tx);
        Ok(())
    }

    /// Make the block end with exactly one reward to `miner`.
    ///
    /// A trailing reward left behind by an abandoned search is replaced
    /// rather than duplicated. Nothing else in the list is touched.
    pub fn set_reward(&mut self, miner: &str, amount: u64) -> Result<(), CoreError> {
        if self.is_mined() {
            return Err(CoreError::AlreadySealed);
        }
        if self.reward().is_some() {
            self.transactions.pop();
        }
        self.transactions.push(Transaction::reward(miner, amount));
        Ok(())
    }

    /// The reward transaction, if the block ends with one.
    pub fn reward(&self) -> Option<&Transaction> {
        self.transactions.last().filter(|tx| tx.is_reward())
    }
}

impl Mineable for Block {
    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn digest(&self) -> Option<Fingerprint> {
        self.hash
    }

    fn preimage(&self, nonce: u64) -> Vec<u8> {
        block_bytes_with_nonce(self, nonce)
    }

    fn seal(&mut self, nonce: u64, digest: Fingerprint) {
        self.nonce = nonce;
        self.hash = Some(digest);
    }

    fn recorded_difficulty(&self) -> Option<Difficulty> {
        Some(self.difficulty)
    }

    fn prepare(&mut self, miner: &str, reward: u64) -> Result<(), CoreError> {
        self.set_reward(miner, reward)
    }
}
