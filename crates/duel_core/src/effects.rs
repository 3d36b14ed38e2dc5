//! Effect application.
//!
//! Each [`Effect`] is resolved against an already-chosen caster/target pair
//! and produces one [`EffectOutcome`]. Renderers decide what to animate from
//! these outcomes alone (a dodged damage outcome is a miss, not an impact).

use serde::{Deserialize, Serialize};

use crate::catalog::Effect;
use crate::combatant::{Combatant, Side};

/// Recorded result of one applied effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectOutcome {
    /// Damage against the target.
    Damage {
        /// Side that received the damage.
        target: Side,
        /// Damage requested by the effect.
        requested: u32,
        /// Portion soaked by the shield.
        absorbed: u32,
        /// Health actually lost.
        dealt: u32,
        /// Whether a dodge nullified the hit.
        dodged: bool,
        /// Target health after the hit.
        remaining_health: u32,
    },
    /// Healing on the caster.
    Heal {
        /// Healing requested by the effect.
        requested: u32,
        /// Health actually restored.
        healed: u32,
    },
    /// Shield added to the caster.
    Shield {
        /// Shield actually added.
        added: u32,
        /// Shield pool after the cast.
        total: u32,
    },
    /// Caster started dodging.
    Dodge {
        /// Declared duration.
        duration: u32,
    },
    /// Slow recorded against the target.
    Slow {
        /// Side that was slowed.
        target: Side,
        /// Declared duration.
        duration: u32,
    },
}

impl EffectOutcome {
    /// Health lost by the target, zero for non-damage outcomes.
    #[must_use]
    pub const fn damage_dealt(&self) -> u32 {
        match self {
            Self::Damage { dealt, .. } => *dealt,
            _ => 0,
        }
    }
}

/// Apply one effect and record what happened.
///
/// `shield_cap` bounds the caster's shield pool when set.
pub fn apply_effect(
    effect: &Effect,
    caster: &mut Combatant,
    target: &mut Combatant,
    shield_cap: Option<u32>,
) -> EffectOutcome {
    match *effect {
        Effect::Damage { amount } => apply_damage(amount, target),
        Effect::Heal { amount } => EffectOutcome::Heal {
            requested: amount,
            healed: caster.health.heal(amount),
        },
        Effect::Shield { amount } => {
            let added = caster.add_shield(amount, shield_cap);
            EffectOutcome::Shield {
                added,
                total: caster.shield,
            }
        }
        Effect::Dodge { duration } => {
            caster.dodging = true;
            EffectOutcome::Dodge { duration }
        }
        Effect::Slow { duration } => EffectOutcome::Slow {
            target: target.side,
            duration,
        },
    }
}

/// Dodge first, then shield, then health.
fn apply_damage(amount: u32, target: &mut Combatant) -> EffectOutcome {
    if target.dodging {
        target.dodging = false;
        return EffectOutcome::Damage {
            target: target.side,
            requested: amount,
            absorbed: 0,
            dealt: 0,
            dodged: true,
            remaining_health: target.health.current,
        };
    }

    let absorbed = target.shield.min(amount);
    target.shield -= absorbed;
    let dealt = target.health.apply_damage(amount - absorbed);

    EffectOutcome::Damage {
        target: target.side,
        requested: amount,
        absorbed,
        dealt,
        dodged: false,
        remaining_health: target.health.current,
    }
}
