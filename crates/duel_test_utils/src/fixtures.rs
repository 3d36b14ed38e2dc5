//! Test fixtures and helpers.
//!
//! Pre-built catalogs and started engines for consistent testing.

use std::sync::Arc;

use duel_core::catalog::{Effect, Tool, ToolCatalog, ToolCategory};
use duel_core::config::{EngineConfig, TimingMode};
use duel_core::engine::CombatEngine;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// The embedded standard catalog.
///
/// # Panics
///
/// Panics if the embedded catalog data is broken.
#[must_use]
pub fn standard_catalog() -> Arc<ToolCatalog> {
    Arc::new(ToolCatalog::standard().expect("embedded catalog must load"))
}

/// A tool with one alias equal to its id and the given effects.
#[must_use]
pub fn tool(
    id: &str,
    category: ToolCategory,
    mana_cost: u32,
    cooldown: u32,
    effects: Vec<Effect>,
) -> Tool {
    Tool {
        id: id.to_string(),
        name: id.to_string(),
        aliases: vec![id.to_string()],
        category,
        mana_cost,
        cooldown,
        effects,
    }
}

/// Small catalog with one tool per effect kind.
///
/// # Panics
///
/// Panics if the fixture tools fail validation.
#[must_use]
pub fn mini_catalog() -> Arc<ToolCatalog> {
    let tools = vec![
        tool("zap", ToolCategory::Attack, 10, 1, vec![Effect::Damage { amount: 15 }]),
        tool("blast", ToolCategory::Attack, 40, 2, vec![Effect::Damage { amount: 45 }]),
        tool("mend", ToolCategory::Utility, 20, 2, vec![Effect::Heal { amount: 25 }]),
        tool("ward", ToolCategory::Defense, 15, 3, vec![Effect::Shield { amount: 20 }]),
        tool("sidestep", ToolCategory::Defense, 5, 2, vec![Effect::Dodge { duration: 1 }]),
        tool("chill", ToolCategory::Attack, 5, 1, vec![Effect::Slow { duration: 2 }]),
    ];
    Arc::new(ToolCatalog::from_tools(tools).expect("fixture catalog must validate"))
}

/// One attack costing 60 mana with no cooldown.
///
/// After each side casts it once, the side whose turn comes back holds 50
/// mana and can no longer act.
///
/// # Panics
///
/// Panics if the fixture tool fails validation.
#[must_use]
pub fn heavy_catalog() -> Arc<ToolCatalog> {
    let heavy = tool("heavy", ToolCategory::Attack, 60, 0, vec![Effect::Damage { amount: 5 }]);
    Arc::new(ToolCatalog::from_tools(vec![heavy]).expect("fixture catalog must validate"))
}

/// Engine on the standard catalog, started at time zero.
#[must_use]
pub fn started_engine(config: EngineConfig) -> CombatEngine {
    let mut engine = CombatEngine::new(standard_catalog(), config);
    engine.start(0);
    engine
}

/// Default turn-based match, player first, dodging disabled.
#[must_use]
pub fn turn_based_engine() -> CombatEngine {
    started_engine(EngineConfig::default())
}

/// Real-time match with the given dodge setting.
#[must_use]
pub fn real_time_engine(dodging_enabled: bool) -> CombatEngine {
    started_engine(EngineConfig::for_mode(TimingMode::RealTime).with_dodging(dodging_enabled))
}
