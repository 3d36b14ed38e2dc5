//! Decision policy.
//!
//! Priority, first match wins, over the tools the bot can use right now:
//!
//! 1. dodging enabled: roll `dodge_chance` to dodge
//! 2. health below `heal_threshold_percent`: heal
//! 3. no shield up: roll `shield_chance` to shield
//! 4. the attack with the biggest first hit (ties go to catalog order)
//! 5. anything usable, uniformly at random
//!
//! Usability comes from the same validation a human is held to.

use duel_core::catalog::Tool;
use duel_core::facade::PlayerFacade;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunable weights for the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Chance to dodge when dodging is enabled and a dodge is usable.
    pub dodge_chance: f64,
    /// Chance to raise a shield when none is up.
    pub shield_chance: f64,
    /// Heal when health is strictly below this percentage of max.
    pub heal_threshold_percent: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            dodge_chance: 0.30,
            shield_chance: 0.40,
            heal_threshold_percent: 40,
        }
    }
}

/// Which priority rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Rolled into a dodge.
    Dodge,
    /// Low health.
    Heal,
    /// No shield up and rolled into one.
    Shield,
    /// Strongest available attack.
    StrongestAttack,
    /// Nothing else applied.
    Random,
}

/// A chosen tool and the rule that chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Tool to cast.
    pub tool: Tool,
    /// Rule that picked it.
    pub rule: DecisionRule,
}

/// `true` with probability `p`. Out-of-range weights saturate.
fn roll<R: Rng>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Pick a tool for the facade's side.
///
/// Returns `None` only when no tool is usable at all.
pub fn decide<F, R>(facade: &F, config: &PolicyConfig, rng: &mut R) -> Option<Decision>
where
    F: PlayerFacade + ?Sized,
    R: Rng,
{
    let usable = facade.usable_tools();
    if usable.is_empty() {
        return None;
    }
    let pick = |tool: &Tool, rule| {
        Some(Decision {
            tool: tool.clone(),
            rule,
        })
    };

    if facade.dodging_enabled() {
        if let Some(dodge) = usable.iter().find(|t| t.is_dodge()) {
            if roll(rng, config.dodge_chance) {
                return pick(*dodge, DecisionRule::Dodge);
            }
        }
    }

    let own = facade.own();
    let health = own.health;
    let low_health = u64::from(health.current) * 100
        < u64::from(health.max) * u64::from(config.heal_threshold_percent);
    if low_health {
        if let Some(heal) = usable.iter().find(|t| t.heals() && !t.is_attack()) {
            return pick(*heal, DecisionRule::Heal);
        }
    }

    if own.shield == 0 {
        if let Some(shield) = usable.iter().find(|t| t.shields()) {
            if roll(rng, config.shield_chance) {
                return pick(*shield, DecisionRule::Shield);
            }
        }
    }

    let mut strongest: Option<(&Tool, u32)> = None;
    for tool in usable.iter().filter(|t| t.is_attack()) {
        let Some(damage) = tool.first_damage() else {
            continue;
        };
        if strongest.map_or(true, |(_, best)| damage > best) {
            strongest = Some((*tool, damage));
        }
    }
    if let Some((tool, _)) = strongest {
        return pick(tool, DecisionRule::StrongestAttack);
    }

    usable
        .choose(rng)
        .and_then(|tool| pick(*tool, DecisionRule::Random))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use duel_core::catalog::{Effect, ToolCatalog, ToolCategory};
    use duel_core::combatant::Side;
    use duel_core::config::EngineConfig;
    use duel_core::engine::CombatEngine;
    use duel_core::facade::EnginePlayerFacade;
    use duel_core::math::Fixed;
    use duel_test_utils::fixtures::{started_engine, tool, turn_based_engine};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn never() -> PolicyConfig {
        PolicyConfig {
            dodge_chance: 0.0,
            shield_chance: 0.0,
            ..PolicyConfig::default()
        }
    }

    fn always() -> PolicyConfig {
        PolicyConfig {
            dodge_chance: 1.0,
            shield_chance: 1.0,
            ..PolicyConfig::default()
        }
    }

    fn decide_for(engine: &mut CombatEngine, config: &PolicyConfig) -> Option<Decision> {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let facade = EnginePlayerFacade::new(engine, Side::Bot);
        decide(&facade, config, &mut rng)
    }

    #[test]
    fn test_strongest_attack_by_default() {
        let mut engine = turn_based_engine();
        let decision = decide_for(&mut engine, &never()).unwrap();
        assert_eq!(decision.tool.id, "fireball");
        assert_eq!(decision.rule, DecisionRule::StrongestAttack);
    }

    #[test]
    fn test_dodge_only_when_enabled() {
        let mut engine = turn_based_engine();
        let decision = decide_for(&mut engine, &always()).unwrap();
        assert_ne!(decision.rule, DecisionRule::Dodge);

        let mut engine = started_engine(EngineConfig::default().with_dodging(true));
        let decision = decide_for(&mut engine, &always()).unwrap();
        assert_eq!(decision.tool.id, "dodge");
    }

    #[test]
    fn test_heal_when_low() {
        let mut engine = turn_based_engine();
        engine.use_tool("fireball", Side::Player, 0).unwrap();
        assert_eq!(engine.state().bot.health.current, 60);
        assert_eq!(
            decide_for(&mut engine, &never()).unwrap().rule,
            DecisionRule::StrongestAttack
        );

        engine.use_tool("fireball", Side::Bot, 0).unwrap();
        engine.use_tool("lightning", Side::Player, 0).unwrap();
        assert_eq!(engine.state().bot.health.current, 35);

        let decision = decide_for(&mut engine, &never()).unwrap();
        assert_eq!(decision.tool.id, "heal");
        assert_eq!(decision.rule, DecisionRule::Heal);
    }

    #[test]
    fn test_shield_only_when_none_up() {
        let mut engine = turn_based_engine();
        assert_eq!(decide_for(&mut engine, &always()).unwrap().rule, DecisionRule::Shield);

        engine.use_tool("strike", Side::Player, 0).unwrap();
        engine.use_tool("shield", Side::Bot, 0).unwrap();
        engine.use_tool("strike", Side::Player, 0).unwrap();
        assert!(engine.state().bot.shield > 0);
        assert_eq!(
            decide_for(&mut engine, &always()).unwrap().rule,
            DecisionRule::StrongestAttack
        );
    }

    #[test]
    fn test_ties_go_to_catalog_order() {
        let tools = vec![
            tool("left", ToolCategory::Attack, 0, 0, vec![Effect::Damage { amount: 12 }]),
            tool("right", ToolCategory::Attack, 0, 0, vec![Effect::Damage { amount: 12 }]),
            tool("weak", ToolCategory::Attack, 0, 0, vec![Effect::Damage { amount: 3 }]),
        ];
        let catalog = Arc::new(ToolCatalog::from_tools(tools).unwrap());
        let mut engine = CombatEngine::new(catalog, EngineConfig::default());
        engine.start(0);
        assert_eq!(decide_for(&mut engine, &never()).unwrap().tool.id, "left");
    }

    #[test]
    fn test_random_fallback_and_starvation() {
        let tools = vec![
            tool("ward", ToolCategory::Defense, 50, 0, vec![Effect::Shield { amount: 5 }]),
            tool("mend", ToolCategory::Utility, 50, 0, vec![Effect::Heal { amount: 5 }]),
        ];
        let catalog = Arc::new(ToolCatalog::from_tools(tools).unwrap());
        let mut engine = CombatEngine::new(catalog, EngineConfig::default());
        engine.start(0);
        let decision = decide_for(&mut engine, &never()).unwrap();
        assert_eq!(decision.rule, DecisionRule::Random);

        let mut broke = CombatEngine::new(
            engine.catalog_arc(),
            EngineConfig {
                starting_mana: 10,
                ..EngineConfig::default()
            },
        );
        broke.start(0);
        assert!(decide_for(&mut broke, &never()).is_none());
        assert_eq!(broke.state().bot.mana.current, Fixed::from_num(10));
    }

    #[test]
    fn test_policy_config_from_ron() {
        let config: PolicyConfig = ron::from_str("(shield_chance: 0.9)").unwrap();
        assert!((config.shield_chance - 0.9).abs() < f64::EPSILON);
        assert!((config.dodge_chance - 0.30).abs() < f64::EPSILON);
        assert_eq!(config.heal_threshold_percent, 40);
    }
}
