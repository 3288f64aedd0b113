//! # powchain core
//!
//! Pure primitives for a proof-of-work ledger: fingerprints, canonical
//! encoding, hash-chained transactions and blocks.
//!
//! This crate contains no I/O and no threads. It is pure computation over
//! hash-linked records.
//!
//! ## Key Types
//!
//! - [`Fingerprint`] - SHA-256 digest used for every hash and signature
//! - [`Transaction`] - A ledger entry, chained through `previous_signature`
//! - [`Block`] - A batch of transactions sealed by proof-of-work
//! - [`Difficulty`] - How many zero hex characters a digest must carry
//! - [`Mineable`] - The seam the miner searches through
//!
//! ## Canonicalization
//!
//! Records are encoded as deterministic CBOR. See the [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod crypto;
pub mod difficulty;
pub mod error;
pub mod mineable;
pub mod transaction;
pub mod validation;

pub use block::{genesis, new_block, Block, BLOCK_REWARD, DEFAULT_MINER};
pub use canonical::{canonical_block_bytes, canonical_transaction_bytes};
pub use crypto::Fingerprint;
pub use difficulty::{Difficulty, ZeroPosition};
pub use error::{CoreError, ValidationError, ValidationFailure};
pub use mineable::Mineable;
pub use transaction::{
    first_divergence, sign_sequence, verify_sequence, Payload, Transaction, NETWORK_ADDRESS,
};
pub use validation::{validate_block, validate_link, validate_seal, BlockRules};
