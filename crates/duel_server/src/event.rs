//! Events published by a match worker.

use duel_core::combatant::Side;
use duel_core::config::TimingMode;
use duel_core::result::{ActionRecord, Rejection};
use duel_core::state::{MatchOutcome, MatchState};

/// Notification broadcast to every subscriber of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// The match (re)started.
    Started {
        /// Timing discipline.
        mode: TimingMode,
    },
    /// A side's action resolved.
    Action {
        /// Full record of the action.
        record: ActionRecord,
    },
    /// A side's action was refused.
    Rejected {
        /// Side that tried to act.
        side: Side,
        /// What was submitted.
        input: String,
        /// Why it was refused.
        reason: Rejection,
    },
    /// Fresh observation snapshot after an action, rejection or tick.
    State(Box<MatchState>),
    /// The side holding the turn has nothing usable, so the turn-based
    /// match cannot continue until it is reset.
    Stalled {
        /// Side that cannot act.
        side: Side,
    },
    /// The match ended.
    GameOver {
        /// How it ended.
        outcome: MatchOutcome,
    },
}
