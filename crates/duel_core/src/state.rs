//! Match state and lifecycle.
//!
//! ```text
//! Idle -> TurnBased { turn } -> Terminal { outcome }
//! Idle -> RealTime           -> Terminal { outcome }
//! ```
//!
//! Nothing leaves `Terminal` except a full reset, which builds a fresh state.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, Side};
use crate::config::EngineConfig;
use crate::result::ActionRecord;

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// One side won.
    Winner(Side),
    /// Both sides reached zero health from the same action.
    Draw,
}

impl MatchOutcome {
    /// The winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::Winner(side) => Some(side),
            Self::Draw => None,
        }
    }
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Created but not started.
    #[default]
    Idle,
    /// Turn-based play; `turn` holds the acting side.
    TurnBased {
        /// Side allowed to act.
        turn: Side,
    },
    /// Real-time play.
    RealTime,
    /// Finished; read-only from here on.
    Terminal {
        /// How it ended.
        outcome: MatchOutcome,
    },
}

/// Complete state of one match.
///
/// Hosts hand out clones of this as the read-only observation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchState {
    /// Human-controlled side.
    pub player: Combatant,
    /// AI-controlled side.
    pub bot: Combatant,
    /// Lifecycle phase.
    pub phase: MatchPhase,
    /// Completed turns (turn-based) or resolved actions (real-time).
    pub turn_count: u64,
    /// Match time of the last real-time tick.
    pub last_tick_ms: u64,
    /// Most recent resolved action, for renderers.
    pub last_action: Option<ActionRecord>,
}

impl MatchState {
    /// Fresh idle state with both sides at starting values.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            player: Combatant::new(Side::Player, config.starting_health, config.starting_mana),
            bot: Combatant::new(Side::Bot, config.starting_health, config.starting_mana),
            phase: MatchPhase::Idle,
            turn_count: 0,
            last_tick_ms: 0,
            last_action: None,
        }
    }

    /// Combatant for a side.
    #[must_use]
    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Bot => &self.bot,
        }
    }

    pub(crate) fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Bot => &mut self.bot,
        }
    }

    /// Split-borrow `(caster, target)` for an acting side.
    pub(crate) fn caster_and_target(&mut self, caster: Side) -> (&mut Combatant, &mut Combatant) {
        match caster {
            Side::Player => (&mut self.player, &mut self.bot),
            Side::Bot => (&mut self.bot, &mut self.player),
        }
    }

    /// Whether the match is terminal.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.phase, MatchPhase::Terminal { .. })
    }

    /// Final outcome once terminal.
    #[must_use]
    pub const fn outcome(&self) -> Option<MatchOutcome> {
        match self.phase {
            MatchPhase::Terminal { outcome } => Some(outcome),
            _ => None,
        }
    }

    /// Winning side once terminal; `None` while running or on a draw.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.outcome().and_then(MatchOutcome::winner)
    }

    /// Side holding the turn in turn-based play.
    #[must_use]
    pub const fn current_turn(&self) -> Option<Side> {
        match self.phase {
            MatchPhase::TurnBased { turn } => Some(turn),
            _ => None,
        }
    }

    /// Deterministic digest of the full state.
    ///
    /// Two engines fed identical inputs must report identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
