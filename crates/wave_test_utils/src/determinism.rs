//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a session produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A session is a pure function of its party, seed, variant and the
//! sequence of calls made on it. Sources of non-determinism include:
//!
//! - **Unseeded randomness**: every draw must come from the session's
//!   seeded generator, never from `thread_rng`.
//!
//! - **Draw order**: wave generation, damage rolls and drop rolls must
//!   consume the generator in a fixed order.
//!
//! - **Unstable sorting**: turn order relies on a stable sort so equal
//!   speeds always resolve the same way.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use wave_core::events::NullObserver;
use wave_core::session::Session;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps taken per run.
    pub steps: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run something multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of independent runs
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Fight the next wave unless the session has ended.
///
/// Engine errors (round limit) end the run the same way a loss does.
pub fn advance(session: &mut Session) {
    if session.is_over() {
        return;
    }
    if let Err(err) = session.run_next_wave(&mut NullObserver) {
        tracing::debug!(%err, "Stopping run");
    }
}

/// Run a session twice and compare final hashes after `waves` waves.
pub fn verify_session_determinism<F>(setup_fn: F, waves: u32) -> bool
where
    F: Fn() -> Session,
{
    verify_determinism(2, waves, &setup_fn, advance, Session::state_hash).is_deterministic
}

/// Result of sessions run on separate threads.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each session.
    pub hashes: Vec<u64>,
    /// Waves each session was asked to fight.
    pub waves: u32,
}

impl ParallelRunResult {
    /// Check if all sessions produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run `count` sessions on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a session thread panics.
pub fn run_parallel_sessions<F>(setup_fn: F, count: usize, waves: u32) -> ParallelRunResult
where
    F: Fn() -> Session + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..count)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup_fn();
                    for _ in 0..waves {
                        advance(&mut session);
                    }
                    session.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect()
    });

    ParallelRunResult { hashes, waves }
}

/// Compare two runs wave by wave, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(wave)` for the first wave after which
/// the hashes differ (0 means the initial states already differ).
pub fn find_first_divergence<F>(setup_fn: F, waves: u32) -> Option<u32>
where
    F: Fn() -> Session,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for wave in 1..=waves {
        advance(&mut a);
        advance(&mut b);
        if a.state_hash() != b.state_hash() {
            return Some(wave);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{demo_party, session, tank_party};
    use crate::strategies::arb_party;
    use proptest::prelude::*;

    #[test]
    fn test_generic_harness_detects_divergence() {
        use std::cell::Cell;
        let counter = Cell::new(0u64);
        let result = verify_determinism(
            3,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |s| *s,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 3);
    }

    #[test]
    fn test_demo_party_is_deterministic() {
        assert!(verify_session_determinism(|| session(demo_party(), 7), 6));
    }

    #[test]
    fn test_harness_reports_matching_hashes() {
        let result = verify_determinism(
            4,
            3,
            || session(tank_party(2), 99),
            advance,
            Session::state_hash,
        );
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 4);
    }

    #[test]
    fn test_threads_agree() {
        let result = run_parallel_sessions(|| session(tank_party(3), 2024), 4, 5);
        assert!(result.is_deterministic());
        assert_eq!(result.hashes.len(), 4);
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(|| session(demo_party(), 5), 5), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_any_party_any_seed_is_deterministic(
            party in arb_party(4),
            seed in any::<u64>(),
        ) {
            let setup = || session(party.clone(), seed);
            prop_assert!(verify_session_determinism(setup, 4));
        }
    }
}
