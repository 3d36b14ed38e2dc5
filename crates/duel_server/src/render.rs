//! Plain-text rendering of records and state for the terminal session.

use std::fmt::Write;

use duel_core::catalog::ToolCatalog;
use duel_core::combatant::{Combatant, Side};
use duel_core::effects::EffectOutcome;
use duel_core::math::{ceil_units, whole_units};
use duel_core::result::ActionRecord;
use duel_core::state::{MatchOutcome, MatchPhase, MatchState};

/// One line per effect, prefixed by who cast what.
#[must_use]
pub fn describe_action(record: &ActionRecord) -> String {
    let mut out = format!("{} casts {}", record.actor, record.tool_name);
    for effect in &record.effects {
        let line = match *effect {
            EffectOutcome::Damage { dodged: true, target, .. } => format!("{target} dodges!"),
            EffectOutcome::Damage {
                target,
                absorbed,
                dealt,
                remaining_health,
                ..
            } if absorbed > 0 => format!(
                "{target} takes {dealt} ({absorbed} absorbed by shield), {remaining_health} HP left"
            ),
            EffectOutcome::Damage {
                target,
                dealt,
                remaining_health,
                ..
            } => format!("{target} takes {dealt}, {remaining_health} HP left"),
            EffectOutcome::Heal { healed, .. } => format!("{} heals {healed}", record.actor),
            EffectOutcome::Shield { added, total } => {
                format!("{} shield +{added} (now {total})", record.actor)
            }
            EffectOutcome::Dodge { .. } => format!("{} gets ready to dodge", record.actor),
            EffectOutcome::Slow { target, duration } => format!("{target} is slowed ({duration})"),
        };
        let _ = write!(out, "\n  {line}");
    }
    out
}

fn describe_side(combatant: &Combatant) -> String {
    let mut line = format!(
        "{:<6} HP {:>3}/{:<3} MP {:>3}/{:<3}",
        combatant.side.label(),
        combatant.health.current,
        combatant.health.max,
        whole_units(combatant.mana.current),
        whole_units(combatant.mana.max),
    );
    if combatant.shield > 0 {
        let _ = write!(line, " shield {}", combatant.shield);
    }
    if combatant.dodging {
        line.push_str(" dodging");
    }
    if !combatant.cooldowns.is_empty() {
        let cooldowns = combatant
            .cooldowns
            .iter()
            .map(|(id, left)| format!("{id}:{}", ceil_units(*left)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(line, " [{cooldowns}]");
    }
    line
}

/// Two status lines plus whose turn it is or how the match ended.
#[must_use]
pub fn describe_state(state: &MatchState) -> String {
    let footer = match state.phase {
        MatchPhase::Idle => "waiting to start".to_string(),
        MatchPhase::TurnBased { turn: Side::Player } => "your turn".to_string(),
        MatchPhase::TurnBased { turn: Side::Bot } => "bot is thinking".to_string(),
        MatchPhase::RealTime => "real time".to_string(),
        MatchPhase::Terminal { outcome } => describe_outcome(outcome),
    };
    format!(
        "{}\n{}\n-- {footer}",
        describe_side(&state.player),
        describe_side(&state.bot)
    )
}

/// Human phrasing of a result.
#[must_use]
pub fn describe_outcome(outcome: MatchOutcome) -> String {
    match outcome {
        MatchOutcome::Winner(Side::Player) => "you win!".to_string(),
        MatchOutcome::Winner(Side::Bot) => "the bot wins".to_string(),
        MatchOutcome::Draw => "draw".to_string(),
    }
}

/// Catalog listing with costs and cooldowns.
#[must_use]
pub fn describe_catalog(catalog: &ToolCatalog) -> String {
    catalog
        .iter()
        .map(|tool| {
            format!(
                "{:<14} {:<8} {:>3} MP  cd {:<2} aka {}",
                tool.name,
                tool.category.label(),
                tool.mana_cost,
                tool.cooldown,
                tool.aliases.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use duel_core::combatant::Side;
    use duel_test_utils::fixtures::{standard_catalog, turn_based_engine};

    use super::*;

    #[test]
    fn test_describe_hit() {
        let mut engine = turn_based_engine();
        let record = engine.use_tool("fireball", Side::Player, 0).unwrap();
        let text = describe_action(&record);
        assert!(text.starts_with("player casts Fireball"));
        assert!(text.contains("bot takes 40, 60 HP left"));
    }

    #[test]
    fn test_describe_state_shows_cooldowns() {
        let mut engine = turn_based_engine();
        engine.use_tool("fireball", Side::Player, 0).unwrap();
        let text = describe_state(engine.state());
        assert!(text.contains("fireball:3"));
        assert!(text.ends_with("bot is thinking"));
    }

    #[test]
    fn test_catalog_listing() {
        let text = describe_catalog(&standard_catalog());
        assert_eq!(text.lines().count(), 8);
        assert!(text.contains("Fireball"));
    }
}
