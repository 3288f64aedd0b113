//! Proptest generators for property-based testing.

use proptest::prelude::*;

use powchain_core::{Difficulty, Fingerprint, Payload, Transaction, ZeroPosition};

/// Generate a random Fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate a zero position.
pub fn zero_position() -> impl Strategy<Value = ZeroPosition> {
    prop_oneof![Just(ZeroPosition::Leading), Just(ZeroPosition::Trailing)]
}

/// Generate a valid difficulty of at most `max_zeros` zeros.
pub fn difficulty(max_zeros: u32) -> impl Strategy<Value = Difficulty> {
    (1..=max_zeros.clamp(1, 64), zero_position()).prop_map(|(zeros, position)| {
        Difficulty::new(zeros, position).expect("zeros within 1..=64")
    })
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=1_900_000_000_000i64
}

/// Generate an account address.
pub fn address() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9' ]{0,23}".prop_map(String::from)
}

/// Generate a calendar date string.
pub fn date() -> impl Strategy<Value = String> {
    (2000u32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

/// Generate a payload: free text or a transfer.
pub fn payload() -> impl Strategy<Value = Payload> {
    prop_oneof![
        ".{0,64}".prop_map(|content| Payload::Memo { content }),
        (address(), address(), any::<u64>())
            .prop_map(|(from, to, amount)| Payload::Transfer { from, to, amount }),
    ]
}

/// Parameters for generating an unsigned transaction.
#[derive(Debug, Clone)]
pub struct TransactionParams {
    pub date: Option<String>,
    pub payload: Payload,
    pub nonce: u64,
}

impl TransactionParams {
    pub fn to_transaction(&self) -> Transaction {
        Transaction {
            date: self.date.clone(),
            payload: self.payload.clone(),
            nonce: self.nonce,
            previous_signature: None,
            signature: None,
        }
    }
}

impl Arbitrary for TransactionParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (proptest::option::of(date()), payload(), any::<u64>())
            .prop_map(|(date, payload, nonce)| TransactionParams {
                date,
                payload,
                nonce,
            })
            .boxed()
    }
}

/// Generate an unsigned transaction.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    any::<TransactionParams>().prop_map(|params| params.to_transaction())
}

/// Generate an unsigned ledger of `1..=max_len` transactions.
pub fn ledger(max_len: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(transaction(), 1..=max_len.max(1))
}
