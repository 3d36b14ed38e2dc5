//! Effect definitions bundled inside a tool's cast sequence.

use serde::{Deserialize, Serialize};

/// One atomic state change applied when a tool is cast.
///
/// The set of kinds is closed: an unrecognised kind in a data file fails
/// deserialization at catalog load, so resolution never meets one.
///
/// # Example RON
///
/// ```ron
/// effects: [Damage(amount: 20), Slow(duration: 2)]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Damage the target, shield first, then health.
    Damage {
        /// Requested damage before shield absorption.
        amount: u32,
    },
    /// Restore the caster's health, capped at maximum.
    Heal {
        /// Requested healing.
        amount: u32,
    },
    /// Add to the caster's shield pool.
    Shield {
        /// Absorption added.
        amount: u32,
    },
    /// Set the caster's one-shot dodge flag.
    ///
    /// The duration is informational; upkeep clears the flag regardless.
    Dodge {
        /// Declared duration (turns or seconds).
        duration: u32,
    },
    /// Slow the target.
    ///
    /// Recorded in results only; it has no mechanical effect.
    Slow {
        /// Declared duration (turns or seconds).
        duration: u32,
    },
}
