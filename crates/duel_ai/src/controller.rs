//! Bot controller: think delays and the real-time loop.
//!
//! The controller never sleeps or spawns anything. Hosts call
//! [`BotController::poll`] with their match clock and use
//! [`BotController::due_at`] to know when to call it next. A pending
//! decision acts as the "already deciding" latch: while one is scheduled,
//! further scheduling is ignored.

use duel_core::combatant::Side;
use duel_core::engine::CombatEngine;
use duel_core::facade::{EnginePlayerFacade, PlayerFacade};
use duel_core::result::ActionResult;
use duel_core::state::MatchPhase;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::policy::{decide, DecisionRule, PolicyConfig};

/// Think-time and re-arm windows, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotTiming {
    /// Shortest simulated think time.
    pub think_min_ms: u64,
    /// Longest simulated think time.
    pub think_max_ms: u64,
    /// Shortest pause after a real-time action.
    pub gap_min_ms: u64,
    /// Longest pause after a real-time action.
    pub gap_max_ms: u64,
}

impl Default for BotTiming {
    fn default() -> Self {
        Self {
            think_min_ms: 600,
            think_max_ms: 1400,
            gap_min_ms: 800,
            gap_max_ms: 2000,
        }
    }
}

impl BotTiming {
    /// Act on the same clock reading it was scheduled at. Used by batch runs.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            think_min_ms: 0,
            think_max_ms: 0,
            gap_min_ms: 0,
            gap_max_ms: 0,
        }
    }

    fn sample(rng: &mut ChaCha8Rng, a: u64, b: u64) -> u64 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        rng.gen_range(lo..=hi)
    }
}

/// What a poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotPoll {
    /// The match is not running or it is not the bot's turn.
    Idle,
    /// The match is over; nothing further will be scheduled.
    Stopped,
    /// A decision is pending until `due_ms`.
    Thinking {
        /// Match time the bot will act at.
        due_ms: u64,
    },
    /// The bot submitted a tool.
    Acted {
        /// Rule that chose the tool.
        rule: DecisionRule,
        /// Engine result for the submission.
        result: ActionResult,
    },
    /// Nothing was usable when the bot came to act.
    Starved,
}

/// Drives one side of a match with the decision policy.
#[derive(Debug, Clone)]
pub struct BotController {
    side: Side,
    policy: PolicyConfig,
    timing: BotTiming,
    rng: ChaCha8Rng,
    due_ms: Option<u64>,
}

impl BotController {
    /// Create a controller for `side` with a seeded generator.
    #[must_use]
    pub fn new(side: Side, policy: PolicyConfig, timing: BotTiming, seed: u64) -> Self {
        Self {
            side,
            policy,
            timing,
            rng: ChaCha8Rng::seed_from_u64(seed),
            due_ms: None,
        }
    }

    /// Side this controller plays.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Whether a decision is pending.
    #[must_use]
    pub const fn is_deciding(&self) -> bool {
        self.due_ms.is_some()
    }

    /// Match time of the pending decision.
    #[must_use]
    pub const fn due_at(&self) -> Option<u64> {
        self.due_ms
    }

    /// Drop any pending decision, e.g. when the match is reset.
    pub fn cancel(&mut self) {
        self.due_ms = None;
    }

    fn think_time(&mut self) -> u64 {
        BotTiming::sample(&mut self.rng, self.timing.think_min_ms, self.timing.think_max_ms)
    }

    /// Start thinking at `now_ms` unless already deciding.
    ///
    /// Returns the due time of the newly scheduled decision, or `None`
    /// when the latch was already held.
    pub fn schedule(&mut self, now_ms: u64) -> Option<u64> {
        if self.due_ms.is_some() {
            return None;
        }
        let think = self.think_time();
        let due = now_ms.saturating_add(think);
        self.due_ms = Some(due);
        tracing::trace!(side = %self.side, due_ms = due, "Bot thinking");
        Some(due)
    }

    /// Advance the controller to `now_ms`, acting if a decision is due.
    ///
    /// In turn-based play a decision is scheduled when the turn reaches the
    /// bot. In real-time play one is scheduled at once, and after each
    /// action the next is pushed back by a random gap plus think time.
    pub fn poll(&mut self, engine: &mut CombatEngine, now_ms: u64) -> BotPoll {
        if engine.is_over() {
            self.due_ms = None;
            return BotPoll::Stopped;
        }

        let mut facade = EnginePlayerFacade::new(engine, self.side);
        if !facade.may_act() {
            self.due_ms = None;
            return BotPoll::Idle;
        }

        let due = match self.due_ms {
            Some(due) => due,
            None => match self.schedule(now_ms) {
                Some(due) => due,
                None => return BotPoll::Idle,
            },
        };
        if now_ms < due {
            return BotPoll::Thinking { due_ms: due };
        }
        self.due_ms = None;

        let outcome = match decide(&facade, &self.policy, &mut self.rng) {
            Some(decision) => {
                let result = facade.use_tool(&decision.tool.id, now_ms);
                tracing::debug!(
                    side = %self.side,
                    tool = %decision.tool.id,
                    rule = ?decision.rule,
                    ok = result.is_ok(),
                    "Bot acted"
                );
                BotPoll::Acted {
                    rule: decision.rule,
                    result,
                }
            }
            None => {
                tracing::debug!(side = %self.side, "Bot has nothing usable");
                BotPoll::Starved
            }
        };

        if facade.match_state().phase == MatchPhase::RealTime {
            let gap = BotTiming::sample(
                &mut self.rng,
                self.timing.gap_min_ms,
                self.timing.gap_max_ms,
            );
            let think = self.think_time();
            self.due_ms = Some(now_ms.saturating_add(gap).saturating_add(think));
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use duel_core::config::{EngineConfig, TimingMode};
    use duel_test_utils::fixtures::{real_time_engine, started_engine, turn_based_engine};

    use super::*;

    fn bot(seed: u64) -> BotController {
        BotController::new(Side::Bot, PolicyConfig::default(), BotTiming::default(), seed)
    }

    #[test]
    fn test_latch_blocks_double_scheduling() {
        let mut controller = bot(1);
        let due = controller.schedule(100).unwrap();
        assert!((700..=1500).contains(&due));
        assert!(controller.is_deciding());
        assert_eq!(controller.schedule(200), None);
        assert_eq!(controller.due_at(), Some(due));
        controller.cancel();
        assert!(!controller.is_deciding());
    }

    #[test]
    fn test_waits_for_its_turn() {
        let mut engine = turn_based_engine();
        let mut controller = bot(2);
        assert_eq!(controller.poll(&mut engine, 0), BotPoll::Idle);
        assert!(!controller.is_deciding());

        engine.use_tool("strike", Side::Player, 0).unwrap();
        let BotPoll::Thinking { due_ms } = controller.poll(&mut engine, 0) else {
            panic!("expected the bot to start thinking");
        };
        assert_eq!(
            controller.poll(&mut engine, due_ms - 1),
            BotPoll::Thinking { due_ms }
        );

        let BotPoll::Acted { result, .. } = controller.poll(&mut engine, due_ms) else {
            panic!("expected the bot to act");
        };
        assert_eq!(result.unwrap().actor, Side::Bot);
        assert_eq!(engine.state().current_turn(), Some(Side::Player));
        assert!(!controller.is_deciding());
    }

    #[test]
    fn test_real_time_rearms_after_acting() {
        let mut engine = real_time_engine(false);
        let mut controller = bot(3);
        let BotPoll::Thinking { due_ms } = controller.poll(&mut engine, 0) else {
            panic!("expected thinking");
        };
        assert!(matches!(controller.poll(&mut engine, due_ms), BotPoll::Acted { .. }));

        let next = controller.due_at().unwrap();
        assert!(next >= due_ms + 800 + 600);
        assert!(next <= due_ms + 2000 + 1400);
    }

    #[test]
    fn test_stops_when_match_ends() {
        let mut engine = real_time_engine(false);
        let mut controller =
            BotController::new(Side::Bot, PolicyConfig::default(), BotTiming::instant(), 4);
        let mut now = 0;
        while !engine.is_over() {
            now += 500;
            engine.tick(now);
            controller.poll(&mut engine, now);
            assert!(now < 600_000, "bot never finished the match");
        }
        assert_eq!(engine.state().winner(), Some(Side::Bot));
        assert_eq!(controller.poll(&mut engine, now + 10_000), BotPoll::Stopped);
        assert!(!controller.is_deciding());
    }

    #[test]
    fn test_same_seed_same_match() {
        let run = |seed| {
            let mut engine = started_engine(EngineConfig::for_mode(TimingMode::RealTime));
            let mut controller = bot(seed);
            for now in (0..20_000).step_by(100) {
                engine.tick(now);
                controller.poll(&mut engine, now);
            }
            engine.state().state_hash()
        };
        assert_eq!(run(9), run(9));
    }
}
