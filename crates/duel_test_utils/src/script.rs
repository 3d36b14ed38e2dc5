//! Scripted action runs.
//!
//! A script is a list of casts and clock advances replayed against an
//! engine. Property tests generate scripts; determinism tests replay them.

use duel_core::combatant::Side;
use duel_core::engine::CombatEngine;
use duel_core::result::ActionResult;

/// One step of a scripted match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Submit free text for a side.
    Cast {
        /// Acting side.
        side: Side,
        /// Text as typed.
        input: String,
    },
    /// Advance the match clock and tick.
    Wait {
        /// Milliseconds to advance.
        ms: u64,
    },
}

impl ScriptStep {
    /// Convenience constructor for a cast.
    #[must_use]
    pub fn cast(side: Side, input: &str) -> Self {
        Self::Cast {
            side,
            input: input.to_string(),
        }
    }
}

/// Engine plus the clock a script drives it with.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    /// Engine under test.
    pub engine: CombatEngine,
    /// Current match time.
    pub now_ms: u64,
}

impl ScriptRunner {
    /// Wrap an engine starting at time zero.
    #[must_use]
    pub fn new(engine: CombatEngine) -> Self {
        Self { engine, now_ms: 0 }
    }

    /// Apply one step, returning the action result for casts.
    pub fn step(&mut self, step: &ScriptStep) -> Option<ActionResult> {
        match step {
            ScriptStep::Cast { side, input } => {
                Some(self.engine.use_tool(input, *side, self.now_ms))
            }
            ScriptStep::Wait { ms } => {
                self.now_ms += ms;
                self.engine.tick(self.now_ms);
                None
            }
        }
    }

    /// Apply every step, collecting cast results in order.
    pub fn run(&mut self, script: &[ScriptStep]) -> Vec<ActionResult> {
        script.iter().filter_map(|step| self.step(step)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::real_time_engine;

    #[test]
    fn test_wait_advances_clock_and_ticks() {
        let mut runner = ScriptRunner::new(real_time_engine(false));
        let results = runner.run(&[
            ScriptStep::cast(Side::Player, "fireball"),
            ScriptStep::Wait { ms: 1_000 },
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(runner.now_ms, 1_000);
        assert!(runner.engine.state().player.cooldown("fireball") < crate::fixtures::fixed(3));
    }
}
