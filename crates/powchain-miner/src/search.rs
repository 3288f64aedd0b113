//! Brute-force nonce search.
//!
//! Workers share one read-only record and walk interleaved nonce ranges:
//! worker `w` of `n` tries `start + 1 + w`, `start + 1 + w + n`, and so on.
//! The first worker to hit the target publishes its solution and raises a
//! shared stop flag that the others poll on every attempt.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use powchain_core::{Difficulty, Fingerprint, Mineable, BLOCK_REWARD, DEFAULT_MINER};
use rand::Rng;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::MinerConfig;
use crate::error::{MinerError, Result};

/// A nonce whose fingerprint satisfies the difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub nonce: u64,
    pub digest: Fingerprint,
}

/// Why a search ended without a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The caller's [`CancelToken`] was triggered.
    Cancelled,
    /// The configured time limit elapsed.
    TimedOut,
    /// The configured attempt budget was spent.
    AttemptLimit,
    /// Every nonce up to `u64::MAX` was tried.
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Cancelled => "cancelled",
            StopReason::TimedOut => "timed out",
            StopReason::AttemptLimit => "attempt limit reached",
            StopReason::Exhausted => "nonce space exhausted",
        };
        f.write_str(s)
    }
}

/// Counters for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningStats {
    /// Fingerprints computed across all workers.
    pub attempts: u64,
    pub elapsed: Duration,
    pub workers: usize,
}

impl MiningStats {
    /// Attempts per second.
    pub fn hash_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return self.attempts as f64;
        }
        self.attempts as f64 / secs
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningOutcome {
    Mined {
        solution: Solution,
        stats: MiningStats,
    },
    Stopped {
        reason: StopReason,
        stats: MiningStats,
    },
}

impl MiningOutcome {
    pub fn is_mined(&self) -> bool {
        matches!(self, MiningOutcome::Mined { .. })
    }

    pub fn solution(&self) -> Option<Solution> {
        match self {
            MiningOutcome::Mined { solution, .. } => Some(*solution),
            MiningOutcome::Stopped { .. } => None,
        }
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            MiningOutcome::Mined { .. } => None,
            MiningOutcome::Stopped { reason, .. } => Some(*reason),
        }
    }

    pub fn stats(&self) -> &MiningStats {
        match self {
            MiningOutcome::Mined { stats, .. } | MiningOutcome::Stopped { stats, .. } => stats,
        }
    }
}

/// State shared by the workers of one search.
struct SearchState {
    stop: AtomicBool,
    attempts: AtomicU64,
    solution: OnceLock<Solution>,
    reason: OnceLock<StopReason>,
}

impl SearchState {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            solution: OnceLock::new(),
            reason: OnceLock::new(),
        }
    }

    fn publish(&self, solution: Solution) {
        // Losing the race is fine: the earlier solution is just as valid.
        let _ = self.solution.set(solution);
        self.stop.store(true, Ordering::SeqCst);
    }

    fn halt(&self, reason: StopReason) {
        let _ = self.reason.set(reason);
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Limits a worker checks while searching.
struct Limits<'a> {
    cancel: &'a CancelToken,
    deadline: Option<Instant>,
    max_attempts: Option<u64>,
    check_interval: u64,
}

/// Proof-of-work searcher.
#[derive(Debug, Clone, Default)]
pub struct Miner {
    config: MinerConfig,
}

impl Miner {
    pub fn new(config: MinerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Search for a nonce that makes `record` satisfy `difficulty`.
    ///
    /// The record is only read. Returns once a solution is found, the token
    /// is cancelled, a configured limit is hit, or the nonce space runs out.
    pub fn search<R>(&self, record: &R, difficulty: Difficulty, cancel: &CancelToken) -> MiningOutcome
    where
        R: Mineable + Sync,
    {
        let workers = self.config.workers.max(1);
        let start = self.starting_nonce(record);
        let started = Instant::now();
        let limits = Limits {
            cancel,
            deadline: self.config.time_limit().map(|limit| started + limit),
            max_attempts: self.config.max_attempts,
            check_interval: self.config.check_interval.max(1),
        };
        let state = SearchState::new();

        debug!(%difficulty, workers, start, "starting nonce search");

        if workers == 1 {
            run_worker(record, difficulty, start.checked_add(1), 1, &state, &limits);
        } else {
            std::thread::scope(|scope| {
                for w in 0..workers {
                    let first = start.checked_add(1 + w as u64);
                    let (state, limits) = (&state, &limits);
                    scope.spawn(move || {
                        run_worker(record, difficulty, first, workers as u64, state, limits)
                    });
                }
            });
        }

        let stats = MiningStats {
            attempts: state.attempts.load(Ordering::SeqCst),
            elapsed: started.elapsed(),
            workers,
        };

        match state.solution.get() {
            Some(solution) => {
                debug!(
                    nonce = solution.nonce,
                    digest = %solution.digest,
                    attempts = stats.attempts,
                    elapsed_ms = stats.elapsed.as_millis() as u64,
                    "nonce search succeeded"
                );
                MiningOutcome::Mined {
                    solution: *solution,
                    stats,
                }
            }
            None => {
                let reason = state.reason.get().copied().unwrap_or(StopReason::Exhausted);
                warn!(%reason, attempts = stats.attempts, "nonce search stopped without a solution");
                MiningOutcome::Stopped { reason, stats }
            }
        }
    }

    /// Search, then seal `record` with the winning nonce and digest.
    ///
    /// Blocks are paid to [`DEFAULT_MINER`] at [`BLOCK_REWARD`]; use
    /// [`Miner::mine_for`] or [`Miner::mine_block`] to name the payee.
    pub fn mine<R>(&self, record: &mut R, difficulty: Difficulty, cancel: &CancelToken) -> Result<MiningOutcome>
    where
        R: Mineable + Sync,
    {
        self.mine_for(record, difficulty, DEFAULT_MINER, BLOCK_REWARD, cancel)
    }

    /// Prepare `record` for `miner`, search, then seal it.
    ///
    /// Fails without touching the record if it is already sealed or commits
    /// to a difficulty other than `difficulty`. A stopped search keeps the
    /// preparation (a block's reward) but leaves nonce and digest unset.
    pub fn mine_for<R>(
        &self,
        record: &mut R,
        difficulty: Difficulty,
        miner: &str,
        reward: u64,
        cancel: &CancelToken,
    ) -> Result<MiningOutcome>
    where
        R: Mineable + Sync,
    {
        if record.is_sealed() {
            return Err(MinerError::AlreadySealed);
        }
        if let Some(recorded) = record.recorded_difficulty() {
            if recorded != difficulty {
                return Err(MinerError::DifficultyMismatch {
                    requested: difficulty,
                    recorded,
                });
            }
        }
        record.prepare(miner, reward)?;

        let outcome = self.search(record, difficulty, cancel);
        if let Some(solution) = outcome.solution() {
            record.seal(solution.nonce, solution.digest);
        }
        Ok(outcome)
    }

    fn starting_nonce<R: Mineable>(&self, record: &R) -> u64 {
        if self.config.randomize_start {
            // Keep clear of the top of the range so a random start cannot
            // exhaust the nonce space early.
            rand::thread_rng().gen_range(0..u64::MAX / 2)
        } else {
            record.nonce()
        }
    }
}

fn run_worker<R: Mineable>(
    record: &R,
    difficulty: Difficulty,
    first: Option<u64>,
    step: u64,
    state: &SearchState,
    limits: &Limits<'_>,
) {
    let mut next = first;
    let mut unflushed = 0u64;

    while let Some(nonce) = next {
        if state.stop.load(Ordering::Relaxed) {
            break;
        }
        if limits.cancel.is_cancelled() {
            state.halt(StopReason::Cancelled);
            break;
        }

        if unflushed >= limits.check_interval {
            let total = state.attempts.fetch_add(unflushed, Ordering::Relaxed) + unflushed;
            unflushed = 0;

            if limits.deadline.is_some_and(|d| Instant::now() >= d) {
                state.halt(StopReason::TimedOut);
                break;
            }
            if limits.max_attempts.is_some_and(|max| total >= max) {
                state.halt(StopReason::AttemptLimit);
                break;
            }
        }

        let digest = record.fingerprint_at(nonce);
        unflushed += 1;

        if difficulty.is_satisfied_by(&digest) {
            state.publish(Solution { nonce, digest });
            break;
        }

        next = nonce.checked_add(step);
    }

    state.attempts.fetch_add(unflushed, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_core::{Block, Transaction, ZeroPosition};
    use proptest::prelude::*;

    fn sample_block() -> Block {
        let mut block = unmined_block(Difficulty::default());
        block.set_reward("tim", 1).unwrap();
        block
    }

    fn unmined_block(difficulty: Difficulty) -> Block {
        powchain_core::genesis(1_513_036_800_000, difficulty)
    }

    #[test]
    fn test_single_worker_finds_solution() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let difficulty = Difficulty::leading(2).unwrap();
        let block = sample_block();

        let outcome = miner.search(&block, difficulty, &CancelToken::new());
        let solution = outcome.solution().unwrap();
        assert!(difficulty.is_satisfied_by(&solution.digest));
        assert_eq!(block.fingerprint_at(solution.nonce), solution.digest);
        assert!(solution.nonce >= 1);
    }

    #[test]
    fn test_single_worker_finds_first_solution() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let difficulty = Difficulty::trailing(1).unwrap();
        let tx = Transaction::memo("2017-12-12", "Tim pays Joel $3");

        let outcome = miner.search(&tx, difficulty, &CancelToken::new());
        let solution = outcome.solution().unwrap();

        let expected = (1u64..)
            .find(|n| difficulty.is_satisfied_by(&tx.fingerprint_at(*n)))
            .unwrap();
        assert_eq!(solution.nonce, expected);
        assert_eq!(outcome.stats().attempts, expected);
    }

    #[test]
    fn test_many_workers_find_valid_solution() {
        let miner = Miner::new(MinerConfig::default().with_workers(4));
        let difficulty = Difficulty::leading(3).unwrap();
        let mut block = unmined_block(difficulty);

        let outcome = miner.mine(&mut block, difficulty, &CancelToken::new()).unwrap();
        assert!(outcome.is_mined());
        assert!(block.verify_work(&difficulty));
        assert_eq!(outcome.stats().workers, 4);
    }

    #[test]
    fn test_cancelled_before_start() {
        let miner = Miner::new(MinerConfig::default().with_workers(2));
        let token = CancelToken::new();
        token.cancel();

        let difficulty = Difficulty::leading(64).unwrap();
        let mut block = unmined_block(difficulty);
        let outcome = miner.mine(&mut block, difficulty, &token).unwrap();

        assert_eq!(outcome.stop_reason(), Some(StopReason::Cancelled));
        assert!(!block.is_mined());
        assert_eq!(block.nonce, 0);
    }

    #[test]
    fn test_cancelled_from_another_thread() {
        let miner = Miner::new(MinerConfig::default().with_workers(2));
        let token = CancelToken::new();
        let block = sample_block();

        let canceller = {
            let token = token.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                token.cancel();
            })
        };

        let outcome = miner.search(&block, Difficulty::leading(64).unwrap(), &token);
        canceller.join().unwrap();
        assert_eq!(outcome.stop_reason(), Some(StopReason::Cancelled));
    }

    #[test]
    fn test_time_limit() {
        let config = MinerConfig::single_threaded().with_time_limit(Duration::from_millis(30));
        let miner = Miner::new(config);

        let outcome = miner.search(
            &sample_block(),
            Difficulty::leading(64).unwrap(),
            &CancelToken::new(),
        );
        assert_eq!(outcome.stop_reason(), Some(StopReason::TimedOut));
        assert!(outcome.stats().elapsed >= Duration::from_millis(30));
    }

    #[test]
    fn test_attempt_limit() {
        let mut config = MinerConfig::single_threaded().with_max_attempts(5_000);
        config.check_interval = 100;
        let miner = Miner::new(config);

        let outcome = miner.search(
            &sample_block(),
            Difficulty::leading(64).unwrap(),
            &CancelToken::new(),
        );
        assert_eq!(outcome.stop_reason(), Some(StopReason::AttemptLimit));
        assert_eq!(outcome.stats().attempts, 5_000);
    }

    #[test]
    fn test_nonce_space_exhaustion_is_explicit() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let mut block = sample_block();
        block.nonce = u64::MAX - 3;

        let outcome = miner.search(&block, Difficulty::leading(64).unwrap(), &CancelToken::new());
        assert_eq!(outcome.stop_reason(), Some(StopReason::Exhausted));
        assert_eq!(outcome.stats().attempts, 3);
    }

    #[test]
    fn test_search_continues_from_stored_nonce() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let mut block = sample_block();
        block.nonce = 1_000;

        let outcome = miner.search(&block, Difficulty::trailing(1).unwrap(), &CancelToken::new());
        assert!(outcome.solution().unwrap().nonce > 1_000);
    }

    #[test]
    fn test_refuses_sealed_record() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let difficulty = Difficulty::leading(1).unwrap();
        let mut block = unmined_block(difficulty);
        miner.mine(&mut block, difficulty, &CancelToken::new()).unwrap();

        let hash = block.hash;
        assert_eq!(
            miner.mine(&mut block, difficulty, &CancelToken::new()),
            Err(MinerError::AlreadySealed)
        );
        assert_eq!(block.hash, hash);
    }

    #[test]
    fn test_mined_block_is_rewarded_at_its_own_difficulty() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let difficulty = Difficulty::leading(1).unwrap();
        let mut block = unmined_block(difficulty);

        let outcome = miner.mine(&mut block, difficulty, &CancelToken::new()).unwrap();
        assert!(outcome.is_mined());
        assert_eq!(block.reward(), Some(&Transaction::reward(DEFAULT_MINER, BLOCK_REWARD)));
        assert!(block.verify_work(&block.difficulty));
    }

    #[test]
    fn test_refuses_difficulty_other_than_recorded() {
        let miner = Miner::new(MinerConfig::single_threaded());
        let recorded = Difficulty::leading(1).unwrap();
        let requested = Difficulty::trailing(1).unwrap();
        let mut block = unmined_block(recorded);
        let before = block.clone();

        assert_eq!(
            miner.mine(&mut block, requested, &CancelToken::new()),
            Err(MinerError::DifficultyMismatch {
                requested,
                recorded
            })
        );
        assert_eq!(block, before);
    }

    #[test]
    fn test_randomized_start_still_valid() {
        let mut config = MinerConfig::default().with_workers(2);
        config.randomize_start = true;
        let miner = Miner::new(config);
        let difficulty = Difficulty::leading(2).unwrap();

        let mut tx = Transaction::transfer("A", "B", 10);
        miner.mine(&mut tx, difficulty, &CancelToken::new()).unwrap();
        assert!(tx.verify_work(&difficulty));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_mined_record_always_verifies(
            content in ".{0,32}",
            zeros in 1u32..=2,
            trailing in any::<bool>(),
            workers in 1usize..=3,
        ) {
            let position = if trailing { ZeroPosition::Trailing } else { ZeroPosition::Leading };
            let difficulty = Difficulty::new(zeros, position).unwrap();
            let miner = Miner::new(MinerConfig::default().with_workers(workers));

            let mut tx = Transaction::memo("2017-12-12", content);
            let outcome = miner.mine(&mut tx, difficulty, &CancelToken::new()).unwrap();

            prop_assert!(outcome.is_mined());
            prop_assert!(tx.verify_work(&difficulty));
            prop_assert_eq!(tx.signature, Some(tx.compute_signature()));
        }
    }
}
