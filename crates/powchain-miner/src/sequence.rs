//! Mined transaction sequences.
//!
//! Plain signing (`sign_sequence`) makes tampering visible but cheap to
//! paper over: a forger just re-signs everything after the edit. Mining each
//! signature makes every re-signed transaction cost a full search.

use powchain_core::{verify_sequence, Difficulty, Transaction, ValidationError, ValidationFailure};

use crate::cancel::CancelToken;
use crate::error::{MinerError, Result};
use crate::search::{Miner, MiningOutcome};

impl Miner {
    /// Chain and mine transactions in order.
    ///
    /// Like `sign_sequence`, but each signature must satisfy `difficulty`.
    /// Inputs are cloned; their own nonces are kept as starting points.
    pub fn mine_sequence(
        &self,
        transactions: &[Transaction],
        difficulty: Difficulty,
        cancel: &CancelToken,
    ) -> Result<Vec<Transaction>> {
        let mut mined = Vec::with_capacity(transactions.len());
        let mut previous_signature = None;

        for (index, tx) in transactions.iter().enumerate() {
            let mut tx = tx.clone();
            tx.previous_signature = previous_signature;
            tx.signature = None;

            match self.mine(&mut tx, difficulty, cancel)? {
                MiningOutcome::Mined { solution, .. } => {
                    previous_signature = Some(solution.digest);
                    mined.push(tx);
                }
                MiningOutcome::Stopped { reason, .. } => {
                    return Err(MinerError::Interrupted { index, reason });
                }
            }
        }

        Ok(mined)
    }
}

/// Verify signatures, links and the work behind every signature.
pub fn verify_mined_sequence(
    transactions: &[Transaction],
    difficulty: &Difficulty,
) -> std::result::Result<(), ValidationFailure> {
    verify_sequence(transactions)?;

    // Signatures are present and recompute correctly at this point; only the
    // work remains to be checked.
    let weak = transactions
        .iter()
        .enumerate()
        .find_map(|(index, tx)| match tx.signature {
            Some(hash) if !difficulty.is_satisfied_by(&hash) => Some((index, hash)),
            _ => None,
        });

    match weak {
        Some((index, hash)) => Err(ValidationFailure::new(
            index,
            ValidationError::InsufficientWork {
                hash,
                difficulty: *difficulty,
            },
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MinerConfig;
    use crate::search::StopReason;
    use powchain_core::{sign_sequence, Payload};

    fn ledger() -> Vec<Transaction> {
        vec![
            Transaction::memo("2017-12-12", "Tim pays Joel $3"),
            Transaction::memo("2017-12-13", "Joel pays Kevin $1.5"),
            Transaction::memo("2017-12-13", "Tim pays Joel $3"),
        ]
    }

    #[test]
    fn test_mined_sequence_verifies() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let difficulty = Difficulty::trailing(3).unwrap();

        let mined = miner
            .mine_sequence(&ledger(), difficulty, &CancelToken::new())
            .unwrap();

        assert_eq!(mined.len(), 3);
        for tx in &mined {
            assert!(tx.signature.unwrap().to_hex().ends_with("000"));
        }
        assert!(verify_mined_sequence(&mined, &difficulty).is_ok());
    }

    #[test]
    fn test_resigned_forgery_lacks_work() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let difficulty = Difficulty::trailing(3).unwrap();
        let mined = miner
            .mine_sequence(&ledger(), difficulty, &CancelToken::new())
            .unwrap();

        // A forger edits and cheaply re-signs without mining.
        let mut forged = mined.clone();
        forged[1].payload = Payload::Memo {
            content: "Joel pays Kevin $15.".into(),
        };
        let forged = sign_sequence(&forged);

        assert!(verify_sequence(&forged).is_ok());
        let failure = verify_mined_sequence(&forged, &difficulty).unwrap_err();
        assert!(failure.index >= 1);
        assert!(matches!(
            failure.reason,
            ValidationError::InsufficientWork { .. }
        ));
    }

    #[test]
    fn test_interrupted_reports_index() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let token = CancelToken::new();
        token.cancel();

        let err = miner
            .mine_sequence(&ledger(), Difficulty::leading(1).unwrap(), &token)
            .unwrap_err();
        assert_eq!(
            err,
            MinerError::Interrupted {
                index: 0,
                reason: StopReason::Cancelled
            }
        );
    }
}
