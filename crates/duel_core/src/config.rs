//! Engine configuration.
//!
//! Loaded from RON by hosts; every field has a default so a config file
//! only needs to name what it changes.
//!
//! # Example RON
//!
//! ```ron
//! (
//!     mode: RealTime,
//!     dodging_enabled: true,
//!     mana_regen: 10,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combatant::Side;
use crate::error::{GameError, Result};
use crate::math::MAX_UNITS;

/// Timing discipline for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingMode {
    /// Sides alternate; cooldowns count turns.
    #[default]
    TurnBased,
    /// Both sides act freely; cooldowns count seconds.
    RealTime,
}

/// Tunable rules for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Timing discipline.
    pub mode: TimingMode,
    /// Dodge tools are rejected unless this is set.
    pub dodging_enabled: bool,
    /// Starting and maximum health for both sides.
    pub starting_health: u32,
    /// Starting and maximum mana for both sides.
    pub starting_mana: u32,
    /// Mana restored per turn upkeep or per real-time regen pulse.
    pub mana_regen: u32,
    /// Minimum gap between real-time regen pulses.
    pub regen_interval_ms: u64,
    /// Optional ceiling on the shield pool. `None` means uncapped.
    pub shield_cap: Option<u32>,
    /// Who acts first in turn-based mode.
    pub first_turn: Side,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: TimingMode::TurnBased,
            dodging_enabled: false,
            starting_health: 100,
            starting_mana: 100,
            mana_regen: 10,
            regen_interval_ms: 1000,
            shield_cap: None,
            first_turn: Side::Player,
        }
    }
}

impl EngineConfig {
    /// Default configuration for the given mode.
    #[must_use]
    pub fn for_mode(mode: TimingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Builder method to enable or disable dodging.
    #[must_use]
    pub fn with_dodging(mut self, enabled: bool) -> Self {
        self.dodging_enabled = enabled;
        self
    }

    /// Check that the values can produce a playable match.
    pub fn validate(&self) -> Result<()> {
        if self.starting_health == 0 {
            return Err(GameError::InvalidConfig(
                "starting_health must be positive".to_string(),
            ));
        }
        if self.regen_interval_ms == 0 {
            return Err(GameError::InvalidConfig(
                "regen_interval_ms must be positive".to_string(),
            ));
        }
        for (field, value) in [
            ("starting_mana", self.starting_mana),
            ("mana_regen", self.mana_regen),
        ] {
            if value > MAX_UNITS {
                return Err(GameError::ValueOutOfRange {
                    owner: "config".to_string(),
                    field,
                    value,
                    limit: MAX_UNITS,
                });
            }
        }
        Ok(())
    }

    /// Parse and validate a config from RON text.
    pub fn from_ron_str(ron_text: &str, source: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text, &path.display().to_string())
    }
}
