//! # powchain
//!
//! The unified API for powchain: a proof-of-work, hash-chained ledger.
//!
//! ## Overview
//!
//! - **Transactions** are chained through their signatures, so editing one
//!   changes its signature and every signature after it.
//! - **Blocks** batch transactions and are sealed by a proof-of-work search
//!   over their canonical bytes.
//! - A **Chain** owns its blocks, accepts only blocks that extend its tip and
//!   can be re-verified end to end at any time.
//! - A **Node** mines on a [`SharedChain`] alongside other nodes, retrying
//!   when it loses an append race.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use powchain::{ChainConfig, Node, Transaction};
//!
//! async fn example() -> powchain::Result<()> {
//!     let node = Node::bootstrap(ChainConfig::default().with_miner_id("tim")).await?;
//!
//!     node.mine_next(vec![
//!         Transaction::transfer("A's address", "B's address", 10),
//!         Transaction::transfer("B's address", "C's address", 3),
//!     ])
//!     .await?;
//!
//!     node.chain().validate()
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `powchain::core` - Records, canonical encoding and validation
//! - `powchain::miner` - Nonce search

pub mod chain;
pub mod config;
pub mod error;
pub mod node;
pub mod shared;

// Re-export component crates
pub use powchain_core as core;
pub use powchain_miner as miner;

pub use chain::{now_millis, BlockFault, Chain};
pub use config::ChainConfig;
pub use error::{ChainError, Result};
pub use node::Node;
pub use shared::SharedChain;

// Re-export commonly used types
pub use powchain_core::{
    genesis, new_block, sign_sequence, Block, Difficulty, Fingerprint, Transaction,
    ValidationError, ZeroPosition,
};
pub use powchain_miner::{CancelToken, Miner, MinerConfig, MiningOutcome, StopReason};
