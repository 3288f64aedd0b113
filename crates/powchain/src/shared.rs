//! A chain shared between concurrent miners.
//!
//! Appends are single-writer: the tip check and the push happen under one
//! write lock, so two blocks can never land at the same height. Mining
//! itself happens outside the lock against a snapshot of the tip; a miner
//! whose tip went stale gets [`ChainError::ChainLinkMismatch`] and rebuilds.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use powchain_core::{Block, Fingerprint};
use tracing::debug;

use crate::chain::{BlockFault, Chain};
use crate::error::Result;

/// A cloneable handle to one chain.
#[derive(Debug, Clone)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    // The only mutation is one push after every check, so a poisoned lock
    // still guards a consistent chain.
    fn read(&self) -> RwLockReadGuard<'_, Chain> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Chain> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the chain under the read lock.
    pub fn with_chain<T>(&self, f: impl FnOnce(&Chain) -> T) -> T {
        f(&self.read())
    }

    /// A point-in-time copy of the whole chain.
    pub fn snapshot(&self) -> Chain {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn tip(&self) -> Option<Block> {
        self.read().tip().cloned()
    }

    pub fn tip_hash(&self) -> Option<Fingerprint> {
        self.read().tip_hash()
    }

    /// A candidate block on top of the tip as it is right now.
    pub fn next_block(&self, timestamp: i64) -> Result<Block> {
        self.read().next_block(timestamp)
    }

    /// Append `block` if it still extends the tip. Returns its height.
    pub fn try_append(&self, block: Block) -> Result<usize> {
        let mut chain = self.write();
        chain.append(block)?;
        let index = chain.len() - 1;
        debug!(index, "shared append committed");
        Ok(index)
    }

    /// Take the chain back if this is the last handle, otherwise copy it.
    pub fn into_chain(self) -> Chain {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => lock.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(inner) => SharedChain { inner }.snapshot(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.read().validate()
    }

    pub fn audit(&self) -> Vec<BlockFault> {
        self.read().audit()
    }
}

impl From<Chain> for SharedChain {
    fn from(chain: Chain) -> Self {
        Self::new(chain)
    }
}
