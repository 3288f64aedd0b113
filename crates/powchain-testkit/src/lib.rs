//! # powchain testkit
//!
//! Testing utilities for powchain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known sequences with the signatures their canonical bytes must produce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Cheap miners, mined blocks and ready-made chains
//!
//! ## Golden Vectors
//!
//! ```rust
//! use powchain_testkit::vectors::verify_all_vectors;
//!
//! for report in verify_all_vectors() {
//!     assert!(report.matches, "{} diverged", report.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use powchain_testkit::generators::TransactionParams;
//!
//! proptest! {
//!     #[test]
//!     fn signature_is_deterministic(params: TransactionParams) {
//!         let t1 = params.to_transaction();
//!         let t2 = params.to_transaction();
//!         prop_assert_eq!(t1.compute_signature(), t2.compute_signature());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use powchain_testkit::fixtures::ChainFixture;
//!
//! let chain = ChainFixture::new().chain(3);
//! assert!(chain.validate().is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_test_tracing, multi_node_configs, now_millis, ChainFixture};
pub use generators::TransactionParams;
pub use vectors::{
    abc_transfers, all_vectors, golden_genesis, tim_joel_kevin, tim_joel_kevin_tampered,
    verify_all_vectors, GoldenVector, VectorReport, GOLDEN_GENESIS_HASH,
};
