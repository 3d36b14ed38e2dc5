//! Determinism testing utilities.
//!
//! The engine must produce identical state from identical inputs so that a
//! client-side copy and an authoritative host always agree. Sources of
//! divergence this harness guards against:
//!
//! - **Floating-point math**: mana and cooldowns use
//!   [`duel_core::math::Fixed`] throughout.
//! - **Hash iteration order**: cooldowns live in a `BTreeMap`.
//! - **Hidden clocks or randomness**: the engine takes time as an argument
//!   and never rolls dice; the AI uses a seeded generator.

use std::thread;

use duel_core::engine::CombatEngine;

use crate::script::{ScriptRunner, ScriptStep};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
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
                "Engine is non-deterministic!\n\
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

/// Run a setup/step pair several times and compare final hashes.
///
/// # Example
///
/// ```ignore
/// use duel_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,
///     100,
///     || turn_based_engine(),
///     |engine| { engine.use_tool("strike", turn(engine), 0); },
///     |engine| engine.state().state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
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

/// Replay one script against fresh engines and compare final hashes.
pub fn verify_script_determinism<F>(
    setup: F,
    script: &[ScriptStep],
    runs: usize,
) -> DeterminismResult
where
    F: Fn() -> CombatEngine,
{
    let hashes = (0..runs)
        .map(|_| {
            let mut runner = ScriptRunner::new(setup());
            runner.run(script);
            runner.engine.state().state_hash()
        })
        .collect::<Vec<_>>();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: script.len() as u64,
    }
}

/// Replay one script on several threads at once and compare final hashes.
///
/// Catches divergence that only shows up under thread scheduling.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn verify_script_determinism_parallel<F>(
    setup: F,
    script: &[ScriptStep],
    threads: usize,
) -> DeterminismResult
where
    F: Fn() -> CombatEngine + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let mut runner = ScriptRunner::new(setup());
                    runner.run(script);
                    runner.engine.state().state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("determinism worker panicked"))
            .collect::<Vec<_>>()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: script.len() as u64,
    }
}

/// Replay a script on two engines step by step and report the first step
/// after which their hashes differ.
pub fn find_first_divergence<F>(setup: F, script: &[ScriptStep]) -> Option<usize>
where
    F: Fn() -> CombatEngine,
{
    let mut a = ScriptRunner::new(setup());
    let mut b = ScriptRunner::new(setup());

    if a.engine.state().state_hash() != b.engine.state().state_hash() {
        return Some(0);
    }

    for (index, step) in script.iter().enumerate() {
        a.step(step);
        b.step(step);
        if a.engine.state().state_hash() != b.engine.state().state_hash() {
            tracing::warn!(step = index + 1, ?step, "Replays diverged");
            return Some(index + 1);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use duel_core::combatant::Side;

    use super::*;
    use crate::fixtures::{real_time_engine, turn_based_engine};

    fn alternating_script() -> Vec<ScriptStep> {
        vec![
            ScriptStep::cast(Side::Player, "fireball"),
            ScriptStep::cast(Side::Bot, "shield"),
            ScriptStep::cast(Side::Player, "zap"),
            ScriptStep::cast(Side::Bot, "drain"),
            ScriptStep::Wait { ms: 250 },
            ScriptStep::cast(Side::Player, "heal"),
        ]
    }

    #[test]
    fn test_turn_based_script_is_deterministic() {
        verify_script_determinism(turn_based_engine, &alternating_script(), 4)
            .assert_deterministic();
    }

    #[test]
    fn test_real_time_script_is_deterministic_across_threads() {
        verify_script_determinism_parallel(|| real_time_engine(true), &alternating_script(), 4)
            .assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(turn_based_engine, &alternating_script()), None);
    }

    #[test]
    fn test_generic_harness() {
        let result = verify_determinism(
            3,
            10,
            turn_based_engine,
            |engine| {
                if let Some(turn) = engine.state().current_turn() {
                    let _ = engine.use_tool("strike", turn, 0);
                }
            },
            |engine| engine.state().state_hash(),
        );
        result.assert_deterministic();
        assert_eq!(result.unique_hashes().len(), 1);
    }
}
