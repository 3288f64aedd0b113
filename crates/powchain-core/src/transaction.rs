//! Transactions and hash-chained signing.
//!
//! A transaction's signature is the fingerprint of its canonical bytes, and
//! those bytes include the previous transaction's signature. Editing any
//! transaction therefore changes its own signature and every one after it,
//! while everything before it stays put.

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_transaction_bytes, transaction_bytes_with_nonce};
use crate::crypto::Fingerprint;
use crate::error::{ValidationError, ValidationFailure};
use crate::mineable::Mineable;

/// Sender address used for block rewards.
pub const NETWORK_ADDRESS: &str = "network";

/// What a transaction says.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    /// Free-form text, e.g. `"Tim pays Joel $3"`.
    Memo { content: String },
    /// A structured transfer of `amount` units.
    Transfer {
        from: String,
        to: String,
        amount: u64,
    },
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-supplied date, e.g. `2017-12-12`.
    pub date: Option<String>,

    pub payload: Payload,

    /// Varied only when the transaction itself is mined.
    pub nonce: u64,

    /// Signature of the preceding transaction (`None` for the first).
    pub previous_signature: Option<Fingerprint>,

    /// Fingerprint of the canonical bytes, which never include this field.
    pub signature: Option<Fingerprint>,
}

impl Transaction {
    fn unsigned(date: Option<String>, payload: Payload) -> Self {
        Self {
            date,
            payload,
            nonce: 0,
            previous_signature: None,
            signature: None,
        }
    }

    /// A dated free-text transaction.
    pub fn memo(date: impl Into<String>, content: impl Into<String>) -> Self {
        Self::unsigned(
            Some(date.into()),
            Payload::Memo {
                content: content.into(),
            },
        )
    }

    /// An undated transfer.
    pub fn transfer(from: impl Into<String>, to: impl Into<String>, amount: u64) -> Self {
        Self::unsigned(
            None,
            Payload::Transfer {
                from: from.into(),
                to: to.into(),
                amount,
            },
        )
    }

    /// The reward paid by the network to whoever mines a block.
    pub fn reward(miner: impl Into<String>, amount: u64) -> Self {
        Self::transfer(NETWORK_ADDRESS, miner, amount)
    }

    /// Attach a date.
    pub fn dated(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Whether this is a network reward.
    pub fn is_reward(&self) -> bool {
        matches!(&self.payload, Payload::Transfer { from, .. } if from == NETWORK_ADDRESS)
    }

    /// Fingerprint of this transaction's canonical bytes.
    pub fn compute_signature(&self) -> Fingerprint {
        Fingerprint::of(&canonical_transaction_bytes(self))
    }

    /// Check the stored signature against a recomputation.
    pub fn verify_signature(&self) -> Result<(), ValidationError> {
        let stored = self.signature.ok_or(ValidationError::MissingSignature)?;
        let computed = self.compute_signature();
        if stored != computed {
            return Err(ValidationError::SignatureMismatch { stored, computed });
        }
        Ok(())
    }
}

impl Mineable for Transaction {
    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn digest(&self) -> Option<Fingerprint> {
        self.signature
    }

    fn preimage(&self, nonce: u64) -> Vec<u8> {
        transaction_bytes_with_nonce(self, nonce)
    }

    fn seal(&mut self, nonce: u64, digest: Fingerprint) {
        self.nonce = nonce;
        self.signature = Some(digest);
    }
}

/// Sign transactions in order, each linked to the signature before it.
///
/// Inputs are left untouched; any signature or link they carry is replaced.
pub fn sign_sequence(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut signed = Vec::with_capacity(transactions.len());
    let mut previous_signature = None;

    for tx in transactions {
        let mut tx = tx.clone();
        tx.previous_signature = previous_signature;
        let signature = tx.compute_signature();
        tx.signature = Some(signature);
        previous_signature = Some(signature);
        signed.push(tx);
    }

    signed
}

/// Recompute every signature and link, reporting the first bad index.
pub fn verify_sequence(transactions: &[Transaction]) -> Result<(), ValidationFailure> {
    let mut expected_previous = None;

    for (index, tx) in transactions.iter().enumerate() {
        if tx.previous_signature != expected_previous {
            return Err(ValidationFailure::new(
                index,
                ValidationError::BrokenLink {
                    expected: expected_previous,
                    got: tx.previous_signature,
                },
            ));
        }
        tx.verify_signature()
            .map_err(|reason| ValidationFailure::new(index, reason))?;
        expected_previous = tx.signature;
    }

    Ok(())
}

/// Index of the first transaction whose signature differs between a
/// known-good signed sequence and a candidate.
///
/// Comparing final signatures is enough to tell *whether* anything changed;
/// this walks forward to say *where*. A length difference counts as a
/// divergence at the end of the shorter sequence.
pub fn first_divergence(known_good: &[Transaction], candidate: &[Transaction]) -> Option<usize> {
    let shared = known_good.len().min(candidate.len());
    let mismatch = known_good
        .iter()
        .zip(candidate)
        .position(|(a, b)| a.signature != b.signature);

    match mismatch {
        Some(index) => Some(index),
        None if known_good.len() != candidate.len() => Some(shared),
        None => None,
    }
}
