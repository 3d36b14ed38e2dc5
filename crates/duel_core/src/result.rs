//! Action records and rejection reasons.
//!
//! `use_tool` never panics for an expected failure. It returns an
//! [`ActionResult`]: either the full [`ActionRecord`] of what happened, or a
//! [`Rejection`] whose `Display` text is the human-readable reason. A
//! rejected call has mutated nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combatant::Side;
use crate::effects::EffectOutcome;

/// Outcome of a `use_tool` call.
pub type ActionResult = std::result::Result<ActionRecord, Rejection>;

/// Why a tool could not be used. The check order is fixed; see
/// [`crate::engine::CombatEngine::use_tool`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The match has not been started.
    #[error("The match has not started")]
    NotStarted,

    /// The match is terminal.
    #[error("The game is already over")]
    GameOver,

    /// Turn-based mode and the other side holds the turn.
    #[error("Not your turn")]
    NotYourTurn,

    /// Free text matched no alias.
    #[error("Unknown tool: '{input}'")]
    UnknownTool {
        /// The text as submitted.
        input: String,
    },

    /// Dodge tools are disabled by configuration.
    #[error("{tool} is unavailable: dodging is disabled")]
    DodgeDisabled {
        /// Display name of the tool.
        tool: String,
    },

    /// Not enough mana.
    #[error("Not enough mana for {tool}: need {required}, have {available}")]
    InsufficientMana {
        /// Display name of the tool.
        tool: String,
        /// Cost of the tool.
        required: u32,
        /// Whole mana available.
        available: u32,
    },

    /// Tool is still cooling down.
    #[error("{tool} is on cooldown ({remaining} remaining)")]
    OnCooldown {
        /// Display name of the tool.
        tool: String,
        /// Remaining cooldown, rounded up to whole turns or seconds.
        remaining: u32,
    },
}

/// Complete record of a resolved action.
///
/// Kept as the match's "last action" for observers. It drives rendering
/// only and never feeds back into combat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Who cast the tool.
    pub actor: Side,
    /// Catalog id of the tool.
    pub tool_id: String,
    /// Display name of the tool.
    pub tool_name: String,
    /// One outcome per effect, in declared order.
    pub effects: Vec<EffectOutcome>,
    /// Match time the action resolved at.
    pub timestamp_ms: u64,
    /// Turn counter when the action was taken.
    pub turn: u64,
}

impl ActionRecord {
    /// Total health the action removed from its targets.
    #[must_use]
    pub fn total_damage(&self) -> u32 {
        self.effects.iter().map(EffectOutcome::damage_dealt).sum()
    }

    /// Whether any damage effect was dodged.
    #[must_use]
    pub fn was_dodged(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, EffectOutcome::Damage { dodged: true, .. }))
    }
}
