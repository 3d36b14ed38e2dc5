//! State invariant checks shared by unit, property and host tests.

use duel_core::combatant::Combatant;
use duel_core::math::Fixed;
use duel_core::state::MatchState;

/// Describe every bound violated by one combatant.
#[must_use]
pub fn combatant_violations(combatant: &Combatant) -> Vec<String> {
    let mut problems = Vec::new();
    let side = combatant.side;

    if combatant.health.current > combatant.health.max {
        problems.push(format!(
            "{side}: health {} above max {}",
            combatant.health.current, combatant.health.max
        ));
    }
    if combatant.mana.current < Fixed::ZERO {
        problems.push(format!("{side}: negative mana {}", combatant.mana.current));
    }
    if combatant.mana.current > combatant.mana.max {
        problems.push(format!(
            "{side}: mana {} above max {}",
            combatant.mana.current, combatant.mana.max
        ));
    }
    for (tool, remaining) in &combatant.cooldowns {
        if *remaining <= Fixed::ZERO {
            problems.push(format!("{side}: cooldown for {tool} stored at {remaining}"));
        }
    }

    problems
}

/// Every bound violated by either side.
#[must_use]
pub fn violations(state: &MatchState) -> Vec<String> {
    let mut problems = combatant_violations(&state.player);
    problems.extend(combatant_violations(&state.bot));

    let anyone_down = state.player.is_defeated() || state.bot.is_defeated();
    if anyone_down && !state.is_over() {
        problems.push("a side is at zero health but the match is still running".to_string());
    }
    problems
}

/// Assert that health, mana, shield and cooldowns are within bounds and
/// that a defeated side always means a terminal match.
///
/// # Panics
///
/// Panics with every violation listed.
pub fn assert_invariants(state: &MatchState) {
    let problems = violations(state);
    assert!(
        problems.is_empty(),
        "Match state invariants violated:\n  {}",
        problems.join("\n  ")
    );
}
