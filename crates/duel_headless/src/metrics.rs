//! Match metrics collection for balance analysis.

use std::collections::BTreeMap;

use duel_core::combatant::Side;
use duel_core::effects::EffectOutcome;
use duel_core::result::ActionRecord;
use duel_core::state::{MatchOutcome, MatchState};
use serde::{Deserialize, Serialize};

use crate::protocol::WireMode;

/// Metrics for one side of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// Casts per tool id.
    pub tools_used: BTreeMap<String, u32>,
    /// Total resolved actions.
    pub actions: u32,
    /// Health removed from the opponent.
    pub damage_dealt: u64,
    /// Damage this side's shield soaked.
    pub damage_absorbed: u64,
    /// Health restored.
    pub healing: u64,
    /// Shield gained.
    pub shield_gained: u64,
    /// Incoming hits this side dodged.
    pub hits_dodged: u32,
    /// Final health.
    pub final_health: u32,
}

/// Complete metrics for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Seed the controllers were built from.
    pub seed: u64,
    /// Timing mode.
    pub mode: WireMode,
    /// How the match ended. `None` if it hit a limit first.
    pub outcome: Option<MatchOutcome>,
    /// Turn counter at the end.
    pub turns: u64,
    /// Virtual match time at the end.
    pub duration_ms: u64,
    /// Stopped by a turn or time limit, or because neither side could act.
    pub timed_out: bool,
    /// Player side metrics.
    pub player: SideMetrics,
    /// Bot side metrics.
    pub bot: SideMetrics,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create empty metrics for a match.
    #[must_use]
    pub fn new(seed: u64, mode: WireMode) -> Self {
        Self {
            seed,
            mode,
            outcome: None,
            turns: 0,
            duration_ms: 0,
            timed_out: false,
            player: SideMetrics::default(),
            bot: SideMetrics::default(),
            final_state_hash: 0,
        }
    }

    /// Metrics for one side.
    pub fn side_mut(&mut self, side: Side) -> &mut SideMetrics {
        match side {
            Side::Player => &mut self.player,
            Side::Bot => &mut self.bot,
        }
    }

    /// Winner, if the match had one.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(MatchOutcome::winner)
    }

    /// Fold a resolved action into the totals.
    pub fn record_action(&mut self, record: &ActionRecord) {
        let caster = self.side_mut(record.actor);
        *caster.tools_used.entry(record.tool_id.clone()).or_default() += 1;
        caster.actions += 1;

        for effect in &record.effects {
            match *effect {
                EffectOutcome::Damage {
                    target,
                    dodged: true,
                    ..
                } => self.side_mut(target).hits_dodged += 1,
                EffectOutcome::Damage {
                    target,
                    absorbed,
                    dealt,
                    ..
                } => {
                    self.side_mut(record.actor).damage_dealt += u64::from(dealt);
                    self.side_mut(target).damage_absorbed += u64::from(absorbed);
                }
                EffectOutcome::Heal { healed, .. } => {
                    self.side_mut(record.actor).healing += u64::from(healed);
                }
                EffectOutcome::Shield { added, .. } => {
                    self.side_mut(record.actor).shield_gained += u64::from(added);
                }
                EffectOutcome::Dodge { .. } | EffectOutcome::Slow { .. } => {}
            }
        }
    }

    /// Close the metrics with the final state.
    pub fn finalize(&mut self, state: &MatchState, now_ms: u64, timed_out: bool) {
        self.outcome = state.outcome();
        self.turns = state.turn_count;
        self.duration_ms = now_ms;
        self.timed_out = timed_out;
        self.player.final_health = state.player.health.current;
        self.bot.final_health = state.bot.health.current;
        self.final_state_hash = state.state_hash();
    }
}

/// Aggregate over a batch of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches played.
    pub total_matches: u32,
    /// Matches the player side won.
    pub player_wins: u32,
    /// Matches the bot side won.
    pub bot_wins: u32,
    /// Matches where both sides fell together.
    pub draws: u32,
    /// Matches stopped by a limit.
    pub timeouts: u32,
    /// Player wins over all matches.
    pub player_win_rate: f64,
    /// Bot wins over all matches.
    pub bot_win_rate: f64,
    /// Average turn counter at the end.
    pub avg_turns: f64,
    /// Shortest match in turns.
    pub min_turns: u64,
    /// Longest match in turns.
    pub max_turns: u64,
    /// Average virtual duration.
    pub avg_duration_ms: f64,
    /// Average damage dealt per match, both sides together.
    pub avg_damage_per_match: f64,
    /// Casts per tool id across every match and both sides.
    pub tool_usage: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Calculate the summary from per-match metrics.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn from_matches(matches: &[MatchMetrics]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_matches: matches.len() as u32,
            min_turns: u64::MAX,
            ..Self::default()
        };

        let mut turn_sum = 0u64;
        let mut duration_sum = 0u64;
        let mut damage_sum = 0u64;
        for game in matches {
            match game.outcome {
                Some(MatchOutcome::Winner(Side::Player)) => summary.player_wins += 1,
                Some(MatchOutcome::Winner(Side::Bot)) => summary.bot_wins += 1,
                Some(MatchOutcome::Draw) => summary.draws += 1,
                None => summary.timeouts += 1,
            }
            turn_sum += game.turns;
            duration_sum += game.duration_ms;
            damage_sum += game.player.damage_dealt + game.bot.damage_dealt;
            summary.min_turns = summary.min_turns.min(game.turns);
            summary.max_turns = summary.max_turns.max(game.turns);

            for side in [&game.player, &game.bot] {
                for (tool, count) in &side.tools_used {
                    *summary.tool_usage.entry(tool.clone()).or_default() += count;
                }
            }
        }

        let n = matches.len() as f64;
        summary.player_win_rate = f64::from(summary.player_wins) / n;
        summary.bot_win_rate = f64::from(summary.bot_wins) / n;
        summary.avg_turns = turn_sum as f64 / n;
        summary.avg_duration_ms = duration_sum as f64 / n;
        summary.avg_damage_per_match = damage_sum as f64 / n;
        summary
    }

    /// Whether the two sides' win rates are within `tolerance` of each other.
    #[must_use]
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        (self.player_win_rate - self.bot_win_rate).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use duel_core::config::{EngineConfig, TimingMode};
    use duel_test_utils::fixtures::started_engine;

    use super::*;

    fn finished(seed: u64, outcome: Option<MatchOutcome>, turns: u64) -> MatchMetrics {
        let mut metrics = MatchMetrics::new(seed, WireMode::TurnBased);
        metrics.outcome = outcome;
        metrics.turns = turns;
        metrics.timed_out = outcome.is_none();
        metrics
    }

    #[test]
    fn test_record_action_totals() {
        let mut engine = started_engine(EngineConfig::for_mode(TimingMode::TurnBased));
        let mut metrics = MatchMetrics::new(1, WireMode::TurnBased);

        let record = engine.use_tool("fireball", Side::Player, 0).unwrap();
        metrics.record_action(&record);
        let record = engine.use_tool("shield", Side::Bot, 0).unwrap();
        metrics.record_action(&record);
        let record = engine.use_tool("lightning", Side::Player, 0).unwrap();
        metrics.record_action(&record);

        assert_eq!(metrics.player.actions, 2);
        assert_eq!(metrics.player.tools_used.get("fireball"), Some(&1));
        assert_eq!(metrics.player.damage_dealt, 40);
        assert_eq!(metrics.bot.shield_gained, 30);
        assert_eq!(metrics.bot.damage_absorbed, 25);

        metrics.finalize(engine.state(), 0, false);
        assert_eq!(metrics.bot.final_health, 60);
        assert_eq!(metrics.turns, 3);
        assert_eq!(metrics.final_state_hash, engine.state().state_hash());
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary::from_matches(&[
            finished(0, Some(MatchOutcome::Winner(Side::Player)), 10),
            finished(1, Some(MatchOutcome::Winner(Side::Bot)), 20),
            finished(2, Some(MatchOutcome::Draw), 30),
            finished(3, None, 40),
        ]);

        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.player_wins, 1);
        assert_eq!(summary.bot_wins, 1);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.timeouts, 1);
        assert!((summary.player_win_rate - 0.25).abs() < 1e-9);
        assert!((summary.avg_turns - 25.0).abs() < 1e-9);
        assert_eq!(summary.min_turns, 10);
        assert_eq!(summary.max_turns, 40);
        assert!(summary.is_balanced(0.0));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_matches(&[]);
        assert_eq!(summary.total_matches, 0);
        assert_eq!(summary.min_turns, 0);
    }
}
