//! Unified player interface for fair AI and human interactions.
//!
//! Human input and the AI both act through [`PlayerFacade`]. A facade is
//! bound to one [`Side`], so it can only submit actions for that side, and
//! it exposes exactly what a human sees on screen: both combatants and the
//! catalog. There is no backdoor that skips validation.

use crate::catalog::{Tool, ToolCatalog};
use crate::combatant::{Combatant, Side};
use crate::engine::CombatEngine;
use crate::result::{ActionResult, Rejection};
use crate::state::MatchState;

/// What one side of the duel can see and do.
pub trait PlayerFacade {
    /// The side this facade acts for.
    fn side(&self) -> Side;

    /// The acting side's combatant.
    fn own(&self) -> &Combatant;

    /// The opposing combatant.
    fn opponent(&self) -> &Combatant;

    /// Full read-only match state.
    fn match_state(&self) -> &MatchState;

    /// Catalog the match validates against.
    fn catalog(&self) -> &ToolCatalog;

    /// Whether dodge tools are enabled for this match.
    fn dodging_enabled(&self) -> bool;

    /// Tools this side could cast right now, in catalog order.
    fn usable_tools(&self) -> Vec<&Tool>;

    /// Validate a cast without performing it.
    ///
    /// # Errors
    /// Returns the first failing [`Rejection`].
    fn can_use_tool(&self, tool_id: &str) -> Result<(), Rejection>;

    /// Submit a cast for this side.
    fn use_tool(&mut self, input: &str, now_ms: u64) -> ActionResult;

    /// Whether this side may act right now (match running and, in
    /// turn-based play, holding the turn).
    fn may_act(&self) -> bool {
        let state = self.match_state();
        match state.current_turn() {
            Some(turn) => turn == self.side(),
            None => matches!(state.phase, crate::state::MatchPhase::RealTime),
        }
    }
}

/// [`PlayerFacade`] over a live [`CombatEngine`].
pub struct EnginePlayerFacade<'a> {
    engine: &'a mut CombatEngine,
    side: Side,
}

impl<'a> EnginePlayerFacade<'a> {
    /// Bind a facade to one side of an engine.
    pub fn new(engine: &'a mut CombatEngine, side: Side) -> Self {
        Self { engine, side }
    }

    /// The underlying engine, read-only.
    #[must_use]
    pub fn engine(&self) -> &CombatEngine {
        self.engine
    }
}

impl PlayerFacade for EnginePlayerFacade<'_> {
    fn side(&self) -> Side {
        self.side
    }

    fn own(&self) -> &Combatant {
        self.engine.state().combatant(self.side)
    }

    fn opponent(&self) -> &Combatant {
        self.engine.state().combatant(self.side.opponent())
    }

    fn match_state(&self) -> &MatchState {
        self.engine.state()
    }

    fn catalog(&self) -> &ToolCatalog {
        self.engine.catalog()
    }

    fn dodging_enabled(&self) -> bool {
        self.engine.config().dodging_enabled
    }

    fn usable_tools(&self) -> Vec<&Tool> {
        self.engine.usable_tools(self.side)
    }

    fn can_use_tool(&self, tool_id: &str) -> Result<(), Rejection> {
        self.engine.can_use_tool(self.side, tool_id)
    }

    fn use_tool(&mut self, input: &str, now_ms: u64) -> ActionResult {
        self.engine.use_tool(input, self.side, now_ms)
    }
}
