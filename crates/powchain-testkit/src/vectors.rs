//! Golden vectors for canonical encoding.
//!
//! Each vector is a transaction sequence with the signatures its canonical
//! bytes must produce. Any implementation that encodes records the same way
//! reproduces these digests exactly.

use powchain_core::{genesis, sign_sequence, Block, Difficulty, Transaction};
use serde::Serialize;

/// A signed sequence with known signatures.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Unsigned inputs, in signing order.
    pub transactions: Vec<Transaction>,
    /// Expected signature of each transaction (hex).
    pub expected_signatures: Vec<&'static str>,
}

/// Outcome of checking one vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VectorReport {
    pub name: String,
    pub matches: bool,
    pub signatures: Vec<String>,
}

/// The three-entry ledger every tamper demonstration starts from.
pub fn tim_joel_kevin() -> Vec<Transaction> {
    vec![
        Transaction::memo("2017-12-12", "Tim pays Joel $3"),
        Transaction::memo("2017-12-13", "Joel pays Kevin $1.5"),
        Transaction::memo("2017-12-13", "Tim pays Joel $3"),
    ]
}

/// The same ledger with the second entry inflated tenfold.
pub fn tim_joel_kevin_tampered() -> Vec<Transaction> {
    let mut ledger = tim_joel_kevin();
    ledger[1] = Transaction::memo("2017-12-13", "Joel pays Kevin $15.");
    ledger
}

/// Structured transfers between three addresses.
pub fn abc_transfers() -> Vec<Transaction> {
    vec![
        Transaction::transfer("A's address", "B's address", 10),
        Transaction::transfer("B's address", "C's address", 3),
    ]
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "tim_joel_kevin",
            transactions: tim_joel_kevin(),
            expected_signatures: vec![
                "4f0e396a10591fca638fd07bef757e65ae18d5858c9d2c305a75c00a3da0217f",
                "8e55d1f6b4fee0d0e92c219d4c2d0bfdb8a7d9cef2e3d997394f414f5d25ee0f",
                "fd199d5d0083ee2a07aba76ef3ee8c7db525e2ebbb65f92d16236115fd257620",
            ],
        },
        GoldenVector {
            name: "tim_joel_kevin_tampered",
            transactions: tim_joel_kevin_tampered(),
            expected_signatures: vec![
                // Unchanged: the edit comes later.
                "4f0e396a10591fca638fd07bef757e65ae18d5858c9d2c305a75c00a3da0217f",
                "889ad6bf6f30f66670ae7ac412f7640f619917dc73648350808edb5fdcfd2c55",
                "f779bda3b7e93f4d81ad8dded82ff6b8bff53e590389eaa9d9769171f9a389ec",
            ],
        },
        GoldenVector {
            name: "abc_transfers",
            transactions: abc_transfers(),
            expected_signatures: vec![
                "784bc4e7c21f5b4199ee1b5f58f281aea13dc02c22a6b29cfe00f5c2f91c37b4",
                "6df2991710dcb5358234afd717a7ebb5a8ac26851250ed4543d89ccc5c3e550e",
            ],
        },
    ]
}

/// Unmined genesis block with its reward already attached.
///
/// Hashing it at nonce 0 must give [`GOLDEN_GENESIS_HASH`].
pub fn golden_genesis() -> Block {
    let mut block = genesis(1_513_036_800_000, Difficulty::default());
    block
        .transactions
        .push(Transaction::reward("tim", powchain_core::BLOCK_REWARD));
    block
}

/// Hash of [`golden_genesis`] at nonce 0 (not a valid proof of work).
pub const GOLDEN_GENESIS_HASH: &str =
    "32b920665573e4e043ecbcca268374ded5c7ce69f3c3f822818347c5ae3a704e";

/// Sign every vector and compare against the expected signatures.
pub fn verify_all_vectors() -> Vec<VectorReport> {
    all_vectors()
        .iter()
        .map(|v| {
            let signatures: Vec<String> = sign_sequence(&v.transactions)
                .iter()
                .filter_map(|tx| tx.signature.map(|s| s.to_hex()))
                .collect();
            let matches = signatures == v.expected_signatures;

            VectorReport {
                name: v.name.to_string(),
                matches,
                signatures,
            }
        })
        .collect()
}

/// Vector reports as pretty JSON, for comparing against other encoders.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&verify_all_vectors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for report in verify_all_vectors() {
            assert!(
                report.matches,
                "Vector '{}' produced {:?}",
                report.name, report.signatures
            );
        }
    }

    #[test]
    fn test_golden_genesis_hash() {
        assert_eq!(golden_genesis().compute_hash().to_hex(), GOLDEN_GENESIS_HASH);
    }

    #[test]
    fn test_tampered_vector_shares_only_prefix() {
        let vectors = all_vectors();
        let original = &vectors[0].expected_signatures;
        let tampered = &vectors[1].expected_signatures;

        assert_eq!(original[0], tampered[0]);
        assert_ne!(original[1], tampered[1]);
        assert_ne!(original[2], tampered[2]);
    }

    #[test]
    fn test_vectors_json() {
        let json = vectors_json().unwrap();
        assert!(json.contains("tim_joel_kevin"));
        assert!(json.contains("\"matches\": true"));
    }
}
