//! Tool definitions.

use serde::{Deserialize, Serialize};

use super::effect::Effect;

/// Broad grouping used by the AI and by UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolCategory {
    /// Offensive tools.
    Attack,
    /// Shields, dodges and other protection.
    Defense,
    /// Healing and everything else.
    Utility,
}

impl ToolCategory {
    /// Lowercase label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Utility => "utility",
        }
    }
}

/// Immutable catalog entry for a castable tool.
///
/// # Example RON
///
/// ```ron
/// (
///     id: "fireball",
///     name: "Fireball",
///     aliases: ["fireball", "fire ball", "fb"],
///     category: Attack,
///     mana_cost: 30,
///     cooldown: 3,
///     effects: [Damage(amount: 40)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tool {
    /// Unique identifier, also the cooldown key.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-text spellings that resolve to this tool.
    ///
    /// Normalized at catalog load; must be unique across the catalog.
    pub aliases: Vec<String>,

    /// Tool category.
    pub category: ToolCategory,

    /// Mana deducted on cast.
    #[serde(default)]
    pub mana_cost: u32,

    /// Cooldown applied on cast, in turns or seconds depending on mode.
    #[serde(default)]
    pub cooldown: u32,

    /// Effects applied in declared order.
    pub effects: Vec<Effect>,
}

impl Tool {
    /// Amount of the first `Damage` effect, if any.
    #[must_use]
    pub fn first_damage(&self) -> Option<u32> {
        self.effects.iter().find_map(|e| match e {
            Effect::Damage { amount } => Some(*amount),
            _ => None,
        })
    }

    /// Whether any effect heals the caster.
    #[must_use]
    pub fn heals(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::Heal { .. }))
    }

    /// Whether any effect adds shield.
    #[must_use]
    pub fn shields(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::Shield { .. }))
    }

    /// Whether this is a dodge tool (gated by `dodging_enabled`).
    #[must_use]
    pub fn is_dodge(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::Dodge { .. }))
    }

    /// Whether the tool is in the attack category.
    #[must_use]
    pub fn is_attack(&self) -> bool {
        self.category == ToolCategory::Attack
    }
}
