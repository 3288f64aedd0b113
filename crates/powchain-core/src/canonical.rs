//! Canonical CBOR encoding of transactions and blocks.
//!
//! Records are encoded as CBOR maps with text keys, following RFC 8949 core
//! deterministic encoding:
//! - map keys sorted by their encoded bytes (shorter keys first, then bytewise)
//! - integers in their smallest encoding
//! - definite lengths only
//! - strings as UTF-8 text, digests as byte strings, absent links as `null`
//! - no floats
//!
//! The field a record's own digest is stored in (`hash` for blocks,
//! `signature` for transactions) is never part of that record's encoding.
//! These bytes are the contract independent validators reproduce, so the
//! layout is frozen: any change invalidates every mined hash.

use ciborium::value::Value;

use crate::block::Block;
use crate::crypto::Fingerprint;
use crate::difficulty::Difficulty;
use crate::transaction::{Payload, Transaction};

/// Map key names.
mod keys {
    pub const AMOUNT: &str = "amount";
    pub const CONTENT: &str = "content";
    pub const DATE: &str = "date";
    pub const DIFFICULTY: &str = "difficulty";
    pub const FROM: &str = "from";
    pub const NONCE: &str = "nonce";
    pub const POSITION: &str = "position";
    pub const PREVIOUS_HASH: &str = "previous_hash";
    pub const PREVIOUS_SIGNATURE: &str = "previous_signature";
    pub const SIGNATURE: &str = "signature";
    pub const TIMESTAMP: &str = "timestamp";
    pub const TO: &str = "to";
    pub const TRANSACTIONS: &str = "transactions";
    pub const ZEROS: &str = "zeros";
}

/// Canonical bytes of a transaction, excluding its signature.
pub fn canonical_transaction_bytes(tx: &Transaction) -> Vec<u8> {
    transaction_bytes_with_nonce(tx, tx.nonce)
}

/// Canonical bytes of a transaction as if its nonce were `nonce`.
///
/// Lets the miner try candidates without touching the record itself.
pub fn transaction_bytes_with_nonce(tx: &Transaction, nonce: u64) -> Vec<u8> {
    encode(&transaction_value(tx, nonce, false))
}

/// Canonical bytes of a block, excluding its hash.
pub fn canonical_block_bytes(block: &Block) -> Vec<u8> {
    block_bytes_with_nonce(block, block.nonce)
}

/// Canonical bytes of a block as if its nonce were `nonce`.
pub fn block_bytes_with_nonce(block: &Block, nonce: u64) -> Vec<u8> {
    encode(&block_value(block, nonce))
}

fn key(name: &str) -> Value {
    Value::Text(name.to_string())
}

fn link(digest: &Option<Fingerprint>) -> Value {
    match digest {
        Some(d) => Value::Bytes(d.0.to_vec()),
        None => Value::Null,
    }
}

/// `embedded` is set when the transaction is part of a block: its signature
/// is then ordinary data and must be covered by the block hash.
fn transaction_value(tx: &Transaction, nonce: u64, embedded: bool) -> Value {
    let date = match &tx.date {
        Some(d) => Value::Text(d.clone()),
        None => Value::Null,
    };

    let mut entries = vec![
        (key(keys::DATE), date),
        (key(keys::NONCE), Value::Integer(nonce.into())),
        (key(keys::PREVIOUS_SIGNATURE), link(&tx.previous_signature)),
    ];

    match &tx.payload {
        Payload::Memo { content } => {
            entries.push((key(keys::CONTENT), Value::Text(content.clone())));
        }
        Payload::Transfer { from, to, amount } => {
            entries.push((key(keys::FROM), Value::Text(from.clone())));
            entries.push((key(keys::TO), Value::Text(to.clone())));
            entries.push((key(keys::AMOUNT), Value::Integer((*amount).into())));
        }
    }

    if embedded {
        entries.push((key(keys::SIGNATURE), link(&tx.signature)));
    }

    Value::Map(entries)
}

fn difficulty_value(difficulty: &Difficulty) -> Value {
    Value::Map(vec![
        (
            key(keys::POSITION),
            Value::Text(difficulty.position().as_str().to_string()),
        ),
        (
            key(keys::ZEROS),
            Value::Integer(difficulty.zeros().into()),
        ),
    ])
}

fn block_value(block: &Block, nonce: u64) -> Value {
    let transactions = block
        .transactions
        .iter()
        .map(|tx| transaction_value(tx, tx.nonce, true))
        .collect();

    Value::Map(vec![
        (key(keys::DIFFICULTY), difficulty_value(&block.difficulty)),
        (key(keys::NONCE), Value::Integer(nonce.into())),
        (key(keys::PREVIOUS_HASH), link(&block.previous_hash)),
        (key(keys::TIMESTAMP), Value::Integer(block.timestamp.into())),
        (key(keys::TRANSACTIONS), Value::Array(transactions)),
    ])
}

fn encode(value: &Value) -> Vec<u8> {
    let mut encoder = Encoder::default();
    encoder.value(value);
    encoder.buf
}

/// Deterministic CBOR writer for the value subset records use.
#[derive(Default)]
struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Write a major type with its argument in the smallest form.
    fn head(&mut self, major: u8, n: u64) {
        let mt = major << 5;
        match n {
            0..=23 => self.buf.push(mt | n as u8),
            24..=0xff => {
                self.buf.push(mt | 24);
                self.buf.push(n as u8);
            }
            0x100..=0xffff => {
                self.buf.push(mt | 25);
                self.buf.extend_from_slice(&(n as u16).to_be_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                self.buf.push(mt | 26);
                self.buf.extend_from_slice(&(n as u32).to_be_bytes());
            }
            _ => {
                self.buf.push(mt | 27);
                self.buf.extend_from_slice(&n.to_be_bytes());
            }
        }
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::Integer(i) => {
                let n: i128 = (*i).into();
                if n >= 0 {
                    self.head(0, n as u64);
                } else {
                    // -1 encodes as 0, -2 as 1, ...
                    self.head(1, (-1 - n) as u64);
                }
            }
            Value::Bytes(b) => {
                self.head(2, b.len() as u64);
                self.buf.extend_from_slice(b);
            }
            Value::Text(s) => {
                self.head(3, s.len() as u64);
                self.buf.extend_from_slice(s.as_bytes());
            }
            Value::Array(items) => {
                self.head(4, items.len() as u64);
                for item in items {
                    self.value(item);
                }
            }
            Value::Map(entries) => self.map(entries),
            Value::Bool(b) => self.buf.push(if *b { 0xf5 } else { 0xf4 }),
            Value::Null => self.buf.push(0xf6),
            Value::Float(_) => panic!("floats not supported in canonical encoding"),
            // Records only reach the encoder through the private builders in
            // this module, which never produce tags or other value kinds.
            other => unreachable!("value not allowed in canonical records: {other:?}"),
        }
    }

    fn map(&mut self, entries: &[(Value, Value)]) {
        let mut encoded: Vec<(Vec<u8>, &Value)> = entries
            .iter()
            .map(|(k, v)| (encode(k), v))
            .collect();
        encoded.sort_by(|a, b| a.0.cmp(&b.0));

        self.head(5, encoded.len() as u64);
        for (key_bytes, value) in encoded {
            self.buf.extend_from_slice(&key_bytes);
            self.value(value);
        }
    }
}
