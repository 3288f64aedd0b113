//! Fingerprinting: SHA-256 digests over canonical bytes.
//!
//! Every hash and signature in the ledger is a [`Fingerprint`]. The hex
//! rendering (64 lowercase characters) is what difficulty predicates are
//! matched against.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Digest length in bytes.
    pub const LEN: usize = 32;

    /// Digest length in hex characters.
    pub const HEX_LEN: usize = Self::LEN * 2;

    /// Compute the SHA-256 fingerprint of the given bytes.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != Self::LEN {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Number of `0` hex characters at the start of the hex rendering.
    pub fn leading_zero_nibbles(&self) -> usize {
        let mut count = 0;
        for byte in self.0 {
            if byte == 0 {
                count += 2;
                continue;
            }
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
        count
    }

    /// Number of `0` hex characters at the end of the hex rendering.
    pub fn trailing_zero_nibbles(&self) -> usize {
        let mut count = 0;
        for byte in self.0.iter().rev() {
            if *byte == 0 {
                count += 2;
                continue;
            }
            if byte & 0x0f == 0 {
                count += 1;
            }
            break;
        }
        count
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// Hex in human-readable formats so exported ledgers look like the digests
// people compare by eye.
impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Fingerprint::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let h1 = Fingerprint::of(b"12345");
        let h2 = Fingerprint::of(b"12345");
        assert_eq!(h1, h2);

        let h3 = Fingerprint::of(b"12346");
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_known_sha256_vector() {
        let h = Fingerprint::of(b"abc");
        assert_eq!(
            h.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_zero_nibble_counts() {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0x00;
        bytes[1] = 0x0a;
        bytes[31] = 0x10;
        let fp = Fingerprint::from_bytes(bytes);
        assert_eq!(fp.leading_zero_nibbles(), 3);
        assert_eq!(fp.trailing_zero_nibbles(), 1);

        let zero = Fingerprint::from_bytes([0u8; 32]);
        assert_eq!(zero.leading_zero_nibbles(), Fingerprint::HEX_LEN);
        assert_eq!(zero.trailing_zero_nibbles(), Fingerprint::HEX_LEN);
    }

    #[test]
    fn test_nibble_counts_agree_with_hex() {
        let fp = Fingerprint::of(b"nibble check");
        let hex = fp.to_hex();
        let leading = hex.chars().take_while(|c| *c == '0').count();
        let trailing = hex.chars().rev().take_while(|c| *c == '0').count();
        assert_eq!(fp.leading_zero_nibbles(), leading);
        assert_eq!(fp.trailing_zero_nibbles(), trailing);
    }

    #[test]
    fn test_hex_roundtrip_and_json() {
        let fp = Fingerprint::of(b"roundtrip");
        assert_eq!(Fingerprint::from_hex(&fp.to_hex()).unwrap(), fp);

        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.to_hex()));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }

    #[test]
    fn test_from_hex_rejects_short_input() {
        assert!(Fingerprint::from_hex("abcd").is_err());
    }
}
