//! Difficulty: how many zero hex characters a digest must carry, and where.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Fingerprint;
use crate::error::CoreError;

/// Which end of the hex digest the zeros must appear at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroPosition {
    Leading,
    Trailing,
}

impl ZeroPosition {
    /// Stable name used in canonical encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            ZeroPosition::Leading => "leading",
            ZeroPosition::Trailing => "trailing",
        }
    }
}

/// A proof-of-work target: `zeros` hex zeros at `position`.
///
/// Always within `1..=64`; the constructors reject anything else, so a
/// `Difficulty` value is valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDifficulty", into = "RawDifficulty")]
pub struct Difficulty {
    zeros: u8,
    position: ZeroPosition,
}

#[derive(Serialize, Deserialize)]
struct RawDifficulty {
    zeros: u32,
    position: ZeroPosition,
}

impl Difficulty {
    /// Build a difficulty, rejecting zero and anything beyond the digest length.
    pub fn new(zeros: u32, position: ZeroPosition) -> Result<Self, CoreError> {
        if zeros == 0 || zeros as usize > Fingerprint::HEX_LEN {
            return Err(CoreError::InvalidDifficulty {
                requested: zeros,
                max: Fingerprint::HEX_LEN,
            });
        }
        Ok(Self {
            zeros: zeros as u8,
            position,
        })
    }

    /// `zeros` leading hex zeros.
    pub fn leading(zeros: u32) -> Result<Self, CoreError> {
        Self::new(zeros, ZeroPosition::Leading)
    }

    /// `zeros` trailing hex zeros.
    pub fn trailing(zeros: u32) -> Result<Self, CoreError> {
        Self::new(zeros, ZeroPosition::Trailing)
    }

    pub fn zeros(&self) -> u32 {
        self.zeros as u32
    }

    pub fn position(&self) -> ZeroPosition {
        self.position
    }

    /// Check whether a digest carries the required zeros.
    pub fn is_satisfied_by(&self, digest: &Fingerprint) -> bool {
        let found = match self.position {
            ZeroPosition::Leading => digest.leading_zero_nibbles(),
            ZeroPosition::Trailing => digest.trailing_zero_nibbles(),
        };
        found >= self.zeros as usize
    }

    /// Whether this difficulty is at least as hard as `minimum`.
    ///
    /// Targets at different ends of the digest are not comparable and never
    /// meet each other.
    pub fn meets(&self, minimum: &Difficulty) -> bool {
        self.position == minimum.position && self.zeros >= minimum.zeros
    }

    /// Expected number of attempts for a uniformly distributed digest (16^k).
    pub fn expected_attempts(&self) -> f64 {
        16f64.powi(self.zeros as i32)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            zeros: 4,
            position: ZeroPosition::Leading,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} zeros", self.zeros, self.position.as_str())
    }
}

impl TryFrom<RawDifficulty> for Difficulty {
    type Error = CoreError;

    fn try_from(raw: RawDifficulty) -> Result<Self, Self::Error> {
        Difficulty::new(raw.zeros, raw.position)
    }
}

impl From<Difficulty> for RawDifficulty {
    fn from(d: Difficulty) -> Self {
        Self {
            zeros: d.zeros as u32,
            position: d.position,
        }
    }
}
