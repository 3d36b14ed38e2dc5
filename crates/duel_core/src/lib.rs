//! # Duel Core
//!
//! Combat resolution engine for two-sided tool duels.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No wall clock (callers pass the match time in milliseconds)
//! - No randomness
//! - No floating-point math (mana and cooldowns use fixed-point)
//!
//! This separation enables:
//! - An authoritative host that serializes every action for one match
//! - Headless and batch runners sharing the exact validation rules
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`catalog`] - Tool and effect definitions, RON loading, alias lookup
//! - [`combatant`] - Per-side health, mana, shield, cooldowns and dodge
//! - [`config`] - Engine configuration and timing modes
//! - [`effects`] - Effect application against a caster/target pair
//! - [`engine`] - Validation, mutation, turn upkeep and real-time ticking
//! - [`facade`] - Side-bound view shared by human input and the AI
//! - [`result`] - Action records and rejection reasons
//! - [`state`] - Match state and lifecycle phases
//! - [`math`] - Fixed-point helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod catalog;
pub mod combatant;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod facade;
pub mod math;
pub mod result;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{Effect, Tool, ToolCatalog, ToolCategory};
    pub use crate::combatant::{Combatant, Health, Mana, Side};
    pub use crate::config::{EngineConfig, TimingMode};
    pub use crate::effects::EffectOutcome;
    pub use crate::engine::CombatEngine;
    pub use crate::error::{GameError, Result};
    pub use crate::facade::{EnginePlayerFacade, PlayerFacade};
    pub use crate::math::Fixed;
    pub use crate::result::{ActionRecord, ActionResult, Rejection};
    pub use crate::state::{MatchOutcome, MatchPhase, MatchState};
}
