//! Host configuration.
//!
//! # Example RON
//!
//! ```ron
//! (
//!     engine: (mode: RealTime, dodging_enabled: true),
//!     bot_timing: (think_min_ms: 400, think_max_ms: 900),
//!     seed: 7,
//!     catalog_path: Some("data/tools.ron"),
//! )
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use duel_ai::{BotTiming, PolicyConfig};
use duel_core::catalog::ToolCatalog;
use duel_core::config::EngineConfig;
use duel_core::error::GameError;
use serde::{Deserialize, Serialize};

/// Everything needed to host one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Combat rules.
    pub engine: EngineConfig,
    /// Bot decision weights.
    pub policy: PolicyConfig,
    /// Bot think and re-arm windows.
    pub bot_timing: BotTiming,
    /// Period of real-time upkeep ticks.
    pub tick_interval_ms: u64,
    /// Seed for the bot's generator.
    pub seed: u64,
    /// Catalog to load instead of the embedded standard one.
    pub catalog_path: Option<PathBuf>,
    /// Capacity of the command channel.
    pub command_buffer: usize,
    /// Capacity of the event broadcast.
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            policy: PolicyConfig::default(),
            bot_timing: BotTiming::default(),
            tick_interval_ms: 100,
            seed: 0,
            catalog_path: None,
            command_buffer: 32,
            event_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Check that the values can host a match.
    pub fn validate(&self) -> duel_core::error::Result<()> {
        self.engine.validate()?;
        if self.tick_interval_ms == 0 {
            return Err(GameError::InvalidConfig(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.command_buffer == 0 || self.event_buffer == 0 {
            return Err(GameError::InvalidConfig(
                "channel buffers must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate from RON text.
    pub fn from_ron_str(ron_text: &str, source: &str) -> duel_core::error::Result<Self> {
        let config: Self = ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> duel_core::error::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text, &path.display().to_string())
    }

    /// Load the configured catalog, or the standard one.
    pub fn catalog(&self) -> duel_core::error::Result<Arc<ToolCatalog>> {
        let catalog = match &self.catalog_path {
            Some(path) => ToolCatalog::load(path)?,
            None => ToolCatalog::standard()?,
        };
        Ok(Arc::new(catalog))
    }
}
