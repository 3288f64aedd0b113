//! The seam between records and the proof-of-work search.

use crate::crypto::Fingerprint;
use crate::difficulty::Difficulty;
use crate::error::CoreError;

/// A record whose digest is found by varying a nonce.
///
/// The search only reads the record (through [`Mineable::preimage`]) so many
/// workers can share it; the winning nonce is written back once, through
/// [`Mineable::seal`].
pub trait Mineable {
    /// The nonce currently stored on the record. Searches start after it.
    fn nonce(&self) -> u64;

    /// The stored digest, if the record has been sealed.
    fn digest(&self) -> Option<Fingerprint>;

    /// Canonical bytes of the record with `nonce` substituted, digest excluded.
    fn preimage(&self, nonce: u64) -> Vec<u8>;

    /// Store the winning nonce and digest. Called exactly once per record.
    fn seal(&mut self, nonce: u64, digest: Fingerprint);

    /// Difficulty the record commits to in its own bytes, if any.
    ///
    /// A record that carries one can only be mined against that target.
    fn recorded_difficulty(&self) -> Option<Difficulty> {
        None
    }

    /// Finish the record on behalf of `miner` before the first hash.
    ///
    /// Runs once per mining attempt. Records with nothing to add keep the
    /// default no-op.
    fn prepare(&mut self, _miner: &str, _reward: u64) -> Result<(), CoreError> {
        Ok(())
    }

    /// Whether the record already carries a digest.
    fn is_sealed(&self) -> bool {
        self.digest().is_some()
    }

    /// Fingerprint of the record at `nonce`.
    fn fingerprint_at(&self, nonce: u64) -> Fingerprint {
        Fingerprint::of(&self.preimage(nonce))
    }

    /// Check the stored digest: one hash, however long the search took.
    fn verify_work(&self, difficulty: &Difficulty) -> bool {
        match self.digest() {
            Some(digest) => {
                digest == self.fingerprint_at(self.nonce()) && difficulty.is_satisfied_by(&digest)
            }
            None => false,
        }
    }
}
