//! The combat engine.
//!
//! [`CombatEngine`] owns one [`MatchState`] and is its only writer. Callers
//! look tools up, validate them and submit them here; every path that
//! changes combat state goes through [`CombatEngine::use_tool`],
//! [`CombatEngine::tick`] or the lifecycle calls.
//!
//! The engine never reads a clock. Hosts pass their match time in
//! milliseconds; the engine only compares and subtracts those values.

use std::sync::Arc;

use crate::catalog::{Tool, ToolCatalog};
use crate::combatant::Side;
use crate::config::{EngineConfig, TimingMode};
use crate::effects::apply_effect;
use crate::math::{ceil_units, seconds_from_millis, units, whole_units, Fixed};
use crate::result::{ActionRecord, ActionResult, Rejection};
use crate::state::{MatchOutcome, MatchPhase, MatchState};

/// Authoritative rules for one match.
#[derive(Debug, Clone)]
pub struct CombatEngine {
    catalog: Arc<ToolCatalog>,
    config: EngineConfig,
    state: MatchState,
}

impl CombatEngine {
    /// Create an engine holding a fresh, idle match.
    #[must_use]
    pub fn new(catalog: Arc<ToolCatalog>, config: EngineConfig) -> Self {
        let state = MatchState::new(&config);
        Self {
            catalog,
            config,
            state,
        }
    }

    /// Leave `Idle` and begin play at `now_ms`.
    ///
    /// Returns `false` (and changes nothing) if the match already started.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state.phase != MatchPhase::Idle {
            tracing::debug!(phase = ?self.state.phase, "Ignoring start on a running match");
            return false;
        }

        self.state.phase = match self.config.mode {
            TimingMode::TurnBased => MatchPhase::TurnBased {
                turn: self.config.first_turn,
            },
            TimingMode::RealTime => MatchPhase::RealTime,
        };
        self.state.last_tick_ms = now_ms;
        self.state.player.last_regen_ms = now_ms;
        self.state.bot.last_regen_ms = now_ms;

        tracing::info!(mode = ?self.config.mode, now_ms, "Match started");
        true
    }

    /// Discard the match and return to a fresh `Idle` state.
    pub fn reset(&mut self) {
        self.state = MatchState::new(&self.config);
        tracing::debug!("Match reset");
    }

    /// Read-only view of the match.
    #[must_use]
    pub const fn state(&self) -> &MatchState {
        &self.state
    }

    /// Owned copy of the match for observers.
    #[must_use]
    pub fn snapshot(&self) -> MatchState {
        self.state.clone()
    }

    /// The tool catalog this engine validates against.
    #[must_use]
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog.
    #[must_use]
    pub fn catalog_arc(&self) -> Arc<ToolCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Rules in force.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the match is terminal.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Resolve free text to a tool by exact normalized alias.
    #[must_use]
    pub fn find_tool(&self, text: &str) -> Option<&Tool> {
        self.catalog.find(text)
    }

    /// Check whether `side` could cast `tool_id` right now.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// the tool exists, dodge tools are enabled, mana covers the cost,
    /// the cooldown has run out. Turn ownership and match phase are
    /// checked by [`Self::use_tool`], not here.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`Rejection`].
    pub fn can_use_tool(&self, side: Side, tool_id: &str) -> Result<(), Rejection> {
        let tool = self
            .catalog
            .get(tool_id)
            .ok_or_else(|| Rejection::UnknownTool {
                input: tool_id.to_string(),
            })?;
        self.check_tool(side, tool)
    }

    fn check_tool(&self, side: Side, tool: &Tool) -> Result<(), Rejection> {
        if tool.is_dodge() && !self.config.dodging_enabled {
            return Err(Rejection::DodgeDisabled {
                tool: tool.name.clone(),
            });
        }

        let caster = self.state.combatant(side);
        if !caster.mana.can_afford(tool.mana_cost) {
            return Err(Rejection::InsufficientMana {
                tool: tool.name.clone(),
                required: tool.mana_cost,
                available: whole_units(caster.mana.current),
            });
        }

        let remaining = caster.cooldown(&tool.id);
        if remaining > Fixed::ZERO {
            return Err(Rejection::OnCooldown {
                tool: tool.name.clone(),
                remaining: ceil_units(remaining),
            });
        }

        Ok(())
    }

    /// Tools `side` could cast right now, in catalog order.
    #[must_use]
    pub fn usable_tools(&self, side: Side) -> Vec<&Tool> {
        self.catalog
            .iter()
            .filter(|tool| self.check_tool(side, tool).is_ok())
            .collect()
    }

    /// In turn-based play, the side holding the turn when it has nothing
    /// usable.
    ///
    /// Turns only pass through [`Self::use_tool`], so a stalled match stays
    /// stalled until it is reset.
    #[must_use]
    pub fn stalled_side(&self) -> Option<Side> {
        match self.state.phase {
            MatchPhase::TurnBased { turn } if self.usable_tools(turn).is_empty() => Some(turn),
            _ => None,
        }
    }

    /// Cast a tool on behalf of `actor`. This is the only action entry point.
    ///
    /// Order of resolution:
    /// 1. the match must be running (`NotStarted`, `GameOver`)
    /// 2. in turn-based play `actor` must hold the turn
    /// 3. `input` must resolve to a tool
    /// 4. [`Self::can_use_tool`] must pass
    /// 5. mana is paid and the cooldown starts
    /// 6. effects apply in declared order
    /// 7. the record becomes the match's last action
    /// 8. a side at zero health ends the match (both at zero is a draw)
    /// 9. in turn-based play the turn passes and the incoming side runs upkeep
    ///
    /// A rejected call mutates nothing.
    pub fn use_tool(&mut self, input: &str, actor: Side, now_ms: u64) -> ActionResult {
        let result = self.resolve(input, actor, now_ms);
        if let Err(reason) = &result {
            tracing::debug!(actor = %actor, input, %reason, "Action rejected");
        }
        #[cfg(feature = "debug-validation")]
        self.debug_check_bounds();
        result
    }

    #[cfg(feature = "debug-validation")]
    fn debug_check_bounds(&self) {
        for combatant in [&self.state.player, &self.state.bot] {
            debug_assert!(combatant.health.current <= combatant.health.max);
            debug_assert!(combatant.mana.current >= Fixed::ZERO);
            debug_assert!(combatant.mana.current <= combatant.mana.max);
            debug_assert!(combatant.cooldowns.values().all(|cd| *cd > Fixed::ZERO));
        }
    }

    fn resolve(&mut self, input: &str, actor: Side, now_ms: u64) -> ActionResult {
        match self.state.phase {
            MatchPhase::Idle => return Err(Rejection::NotStarted),
            MatchPhase::Terminal { .. } => return Err(Rejection::GameOver),
            MatchPhase::TurnBased { turn } if turn != actor => {
                return Err(Rejection::NotYourTurn);
            }
            MatchPhase::TurnBased { .. } | MatchPhase::RealTime => {}
        }

        let catalog = Arc::clone(&self.catalog);
        let tool = catalog.find(input).ok_or_else(|| Rejection::UnknownTool {
            input: input.to_string(),
        })?;
        self.check_tool(actor, tool)?;

        let shield_cap = self.config.shield_cap;
        let (caster, target) = self.state.caster_and_target(actor);
        caster.mana.spend(tool.mana_cost);
        caster.start_cooldown(&tool.id, tool.cooldown);

        let effects = tool
            .effects
            .iter()
            .map(|effect| apply_effect(effect, caster, target, shield_cap))
            .collect();

        let record = ActionRecord {
            actor,
            tool_id: tool.id.clone(),
            tool_name: tool.name.clone(),
            effects,
            timestamp_ms: now_ms,
            turn: self.state.turn_count,
        };
        tracing::debug!(
            actor = %actor,
            tool = %tool.id,
            damage = record.total_damage(),
            dodged = record.was_dodged(),
            "Action resolved"
        );
        self.state.last_action = Some(record.clone());

        if self.check_termination() {
            return Ok(record);
        }

        match self.state.phase {
            MatchPhase::TurnBased { turn } => self.advance_turn(turn.opponent()),
            _ => self.state.turn_count += 1,
        }

        Ok(record)
    }

    /// End the match if either side is down. Returns whether it ended.
    fn check_termination(&mut self) -> bool {
        let outcome = match (
            self.state.player.is_defeated(),
            self.state.bot.is_defeated(),
        ) {
            (true, true) => MatchOutcome::Draw,
            (true, false) => MatchOutcome::Winner(Side::Bot),
            (false, true) => MatchOutcome::Winner(Side::Player),
            (false, false) => return false,
        };

        self.state.phase = MatchPhase::Terminal { outcome };
        tracing::info!(
            ?outcome,
            turns = self.state.turn_count,
            state_hash = self.state.state_hash(),
            "Match over"
        );
        true
    }

    /// Hand the turn to `incoming` and run its upkeep.
    fn advance_turn(&mut self, incoming: Side) {
        self.state.turn_count += 1;
        self.state.phase = MatchPhase::TurnBased { turn: incoming };

        let regen = units(self.config.mana_regen);
        let combatant = self.state.combatant_mut(incoming);
        combatant.decay_cooldowns(Fixed::ONE);
        combatant.mana.restore(regen);
        combatant.dodging = false;

        tracing::debug!(turn = %incoming, turn_count = self.state.turn_count, "Turn passed");
    }

    /// Advance real-time upkeep to `now_ms`.
    ///
    /// Cooldowns decay by the exact elapsed time since the previous tick.
    /// Each side whose last regen pulse is at least `regen_interval_ms` old
    /// gains `mana_regen`, loses its dodge flag and restarts its interval.
    /// Does nothing outside real-time play or when `now_ms` has not moved.
    pub fn tick(&mut self, now_ms: u64) {
        if self.state.phase != MatchPhase::RealTime {
            return;
        }

        let elapsed = now_ms.saturating_sub(self.state.last_tick_ms);
        if elapsed == 0 {
            return;
        }
        self.state.last_tick_ms = now_ms;

        let decay = seconds_from_millis(elapsed);
        let regen = units(self.config.mana_regen);
        let interval = self.config.regen_interval_ms;

        for side in [Side::Player, Side::Bot] {
            let combatant = self.state.combatant_mut(side);
            combatant.decay_cooldowns(decay);

            if now_ms.saturating_sub(combatant.last_regen_ms) >= interval {
                combatant.mana.restore(regen);
                combatant.dodging = false;
                combatant.last_regen_ms = now_ms;
                tracing::trace!(side = %side, now_ms, "Regen pulse");
            }
        }

        #[cfg(feature = "debug-validation")]
        self.debug_check_bounds();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectOutcome;
    use crate::math::MAX_UNITS;

    fn engine(config: EngineConfig) -> CombatEngine {
        let catalog = Arc::new(ToolCatalog::standard().unwrap());
        let mut engine = CombatEngine::new(catalog, config);
        assert!(engine.start(0));
        engine
    }

    fn turn_based() -> CombatEngine {
        engine(EngineConfig::default())
    }

    fn real_time() -> CombatEngine {
        engine(EngineConfig::for_mode(TimingMode::RealTime).with_dodging(true))
    }

    #[test]
    fn test_idle_match_rejects_actions() {
        let catalog = Arc::new(ToolCatalog::standard().unwrap());
        let mut engine = CombatEngine::new(catalog, EngineConfig::default());
        assert_eq!(
            engine.use_tool("fireball", Side::Player, 0),
            Err(Rejection::NotStarted)
        );
        assert!(engine.start(0));
        assert!(!engine.start(10));
    }

    #[test]
    fn test_fireball_end_to_end() {
        let mut engine = turn_based();
        let record = engine.use_tool("fireball", Side::Player, 5).unwrap();

        assert_eq!(record.tool_name, "Fireball");
        assert_eq!(record.total_damage(), 40);
        assert_eq!(record.timestamp_ms, 5);
        let state = engine.state();
        assert_eq!(state.bot.health.current, 60);
        assert_eq!(state.player.mana.current, Fixed::from_num(70));
        assert_eq!(state.player.cooldown("fireball"), Fixed::from_num(3));
        assert_eq!(state.current_turn(), Some(Side::Bot));
        assert_eq!(state.turn_count, 1);
        assert_eq!(state.last_action.as_ref(), Some(&record));
    }

    #[test]
    fn test_second_cast_same_turn_is_not_your_turn() {
        let mut engine = turn_based();
        engine.use_tool("fireball", Side::Player, 0).unwrap();
        let before = engine.snapshot();
        assert_eq!(
            engine.use_tool("fireball", Side::Player, 1),
            Err(Rejection::NotYourTurn)
        );
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_unknown_tool() {
        let mut engine = turn_based();
        let err = engine.use_tool("teleport", Side::Player, 0).unwrap_err();
        assert_eq!(
            err,
            Rejection::UnknownTool {
                input: "teleport".to_string()
            }
        );
        assert_eq!(engine.state().current_turn(), Some(Side::Player));
    }

    #[test]
    fn test_can_use_tool_check_order() {
        let mut engine = turn_based();
        assert!(matches!(
            engine.can_use_tool(Side::Player, "blink"),
            Err(Rejection::UnknownTool { .. })
        ));
        assert!(matches!(
            engine.can_use_tool(Side::Player, "dodge"),
            Err(Rejection::DodgeDisabled { .. })
        ));

        engine.state.player.mana.current = Fixed::from_num(5);
        engine.state.player.start_cooldown("fireball", 2);
        assert!(matches!(
            engine.can_use_tool(Side::Player, "fireball"),
            Err(Rejection::InsufficientMana {
                required: 30,
                available: 5,
                ..
            })
        ));

        engine.state.player.mana.current = Fixed::from_num(100);
        assert_eq!(
            engine.can_use_tool(Side::Player, "fireball"),
            Err(Rejection::OnCooldown {
                tool: "Fireball".to_string(),
                remaining: 2
            })
        );
    }

    #[test]
    fn test_insufficient_mana_mutates_nothing() {
        let mut engine = turn_based();
        engine.state.player.mana.current = Fixed::from_num(10);
        let before = engine.snapshot();

        let err = engine.use_tool("fireball", Side::Player, 0).unwrap_err();
        assert!(err.to_string().contains("mana"));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_turn_upkeep_applies_to_incoming_side() {
        let mut engine = turn_based();
        engine.use_tool("fireball", Side::Player, 0).unwrap();
        engine.use_tool("strike", Side::Bot, 0).unwrap();

        let player = &engine.state().player;
        assert_eq!(player.cooldown("fireball"), Fixed::from_num(2));
        assert_eq!(player.mana.current, Fixed::from_num(80));

        // Strike has a one-turn cooldown that the bot's next upkeep clears.
        assert_eq!(engine.state().bot.cooldown("strike"), Fixed::ONE);
        engine.use_tool("strike", Side::Player, 0).unwrap();
        assert!(engine.state().bot.is_ready("strike"));
    }

    #[test]
    fn test_turns_alternate() {
        let mut engine = turn_based();
        for (i, side) in [Side::Player, Side::Bot, Side::Player, Side::Bot]
            .into_iter()
            .enumerate()
        {
            assert_eq!(engine.state().current_turn(), Some(side));
            engine.use_tool("strike", side, 0).unwrap();
            assert_eq!(engine.state().turn_count, i as u64 + 1);
        }
    }

    #[test]
    fn test_dodge_lasts_through_opponent_turn() {
        let mut engine = engine(EngineConfig::default().with_dodging(true));
        engine.use_tool("dodge", Side::Player, 0).unwrap();
        assert!(engine.state().player.dodging);

        let record = engine.use_tool("fireball", Side::Bot, 0).unwrap();
        assert!(record.was_dodged());
        assert_eq!(engine.state().player.health.current, 100);
        assert!(!engine.state().player.dodging);
    }

    #[test]
    fn test_unused_dodge_clears_at_own_upkeep() {
        let mut engine = engine(EngineConfig::default().with_dodging(true));
        engine.use_tool("dodge", Side::Player, 0).unwrap();
        engine.use_tool("shield", Side::Bot, 0).unwrap();
        assert!(!engine.state().player.dodging);
    }

    #[test]
    fn test_shield_then_damage_sequence() {
        let mut engine = turn_based();
        engine.use_tool("shield", Side::Player, 0).unwrap();
        engine.use_tool("lightning", Side::Bot, 0).unwrap();
        assert_eq!(engine.state().player.shield, 5);
        assert_eq!(engine.state().player.health.current, 100);
    }

    #[test]
    fn test_lethal_damage_ends_match() {
        let mut engine = turn_based();
        engine.state.bot.health.current = 30;
        engine.use_tool("fireball", Side::Player, 0).unwrap();

        assert!(engine.is_over());
        assert_eq!(engine.state().winner(), Some(Side::Player));
        assert_eq!(engine.state().turn_count, 0);

        let before = engine.snapshot();
        assert_eq!(
            engine.use_tool("strike", Side::Bot, 0),
            Err(Rejection::GameOver)
        );
        engine.tick(10_000);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_reset_recreates_idle_match() {
        let mut engine = turn_based();
        engine.use_tool("fireball", Side::Player, 0).unwrap();
        engine.reset();
        assert_eq!(engine.state().phase, MatchPhase::Idle);
        assert_eq!(engine.state().bot.health.current, 100);
        assert!(engine.state().last_action.is_none());
    }

    #[test]
    fn test_usable_tools_in_catalog_order() {
        let mut engine = turn_based();
        let ids: Vec<_> = engine
            .usable_tools(Side::Player)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert!(!ids.contains(&"dodge"));
        assert_eq!(ids.first(), Some(&"fireball"));

        engine.state.player.mana.current = Fixed::ZERO;
        let ids: Vec<_> = engine
            .usable_tools(Side::Player)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["strike"]);
    }

    #[test]
    fn test_real_time_both_sides_act_freely() {
        let mut engine = real_time();
        engine.use_tool("strike", Side::Bot, 100).unwrap();
        engine.use_tool("lightning", Side::Player, 150).unwrap();
        engine.use_tool("lightning", Side::Bot, 200).unwrap();
        assert_eq!(engine.state().turn_count, 3);
        assert_eq!(engine.state().phase, MatchPhase::RealTime);
    }

    #[test]
    fn test_real_time_cooldown_decays_by_elapsed_time() {
        let mut engine = real_time();
        engine.use_tool("fireball", Side::Player, 0).unwrap();

        engine.tick(500);
        assert_eq!(
            engine.state().player.cooldown("fireball"),
            Fixed::from_num(2.5)
        );
        assert!(matches!(
            engine.can_use_tool(Side::Player, "fireball"),
            Err(Rejection::OnCooldown { remaining: 3, .. })
        ));

        engine.tick(3_000);
        assert!(engine.state().player.is_ready("fireball"));
    }

    #[test]
    fn test_real_time_regen_pulse() {
        let mut engine = real_time();
        engine.use_tool("fireball", Side::Player, 0).unwrap();
        engine.use_tool("dodge", Side::Bot, 0).unwrap();

        engine.tick(999);
        assert_eq!(engine.state().player.mana.current, Fixed::from_num(70));
        assert!(engine.state().bot.dodging);

        engine.tick(1_000);
        assert_eq!(engine.state().player.mana.current, Fixed::from_num(80));
        assert!(!engine.state().bot.dodging);
        assert_eq!(engine.state().player.last_regen_ms, 1_000);

        engine.tick(1_500);
        assert_eq!(engine.state().player.mana.current, Fixed::from_num(80));
    }

    #[test]
    fn test_tick_ignored_in_turn_based_mode() {
        let mut engine = turn_based();
        engine.use_tool("fireball", Side::Player, 0).unwrap();
        let before = engine.snapshot();
        engine.tick(5_000);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_drain_heals_caster() {
        let mut engine = turn_based();
        engine.state.player.health.current = 90;
        let record = engine.use_tool("life drain", Side::Player, 0).unwrap();
        assert_eq!(
            record.effects[1],
            EffectOutcome::Heal {
                requested: 20,
                healed: 10
            }
        );
        assert_eq!(engine.state().player.health.current, 100);
        assert_eq!(engine.state().bot.health.current, 80);
    }

    #[test]
    fn test_both_sides_down_is_a_draw() {
        let mut engine = turn_based();
        engine.state.player.health.current = 0;
        engine.state.bot.health.current = 0;

        assert!(engine.check_termination());
        assert_eq!(engine.state().outcome(), Some(MatchOutcome::Draw));
        assert_eq!(engine.state().winner(), None);
        assert_eq!(
            engine.use_tool("fireball", Side::Player, 0),
            Err(Rejection::GameOver)
        );
    }

    #[test]
    fn test_one_side_down_wins_for_the_other() {
        let mut engine = turn_based();
        engine.state.player.health.current = 0;
        assert!(engine.check_termination());
        assert_eq!(engine.state().winner(), Some(Side::Bot));
    }

    #[test]
    fn test_turn_holder_without_usable_tools_stalls() {
        let heavy = Tool {
            id: "heavy".to_string(),
            name: "Heavy".to_string(),
            aliases: vec!["heavy".to_string()],
            category: crate::catalog::ToolCategory::Attack,
            mana_cost: 60,
            cooldown: 0,
            effects: vec![crate::catalog::Effect::Damage { amount: 5 }],
        };
        let catalog = Arc::new(ToolCatalog::from_tools(vec![heavy]).unwrap());
        let mut engine = CombatEngine::new(catalog, EngineConfig::default());
        assert_eq!(engine.stalled_side(), None);
        assert!(engine.start(0));
        assert_eq!(engine.stalled_side(), None);

        engine.use_tool("heavy", Side::Player, 0).unwrap();
        engine.use_tool("heavy", Side::Bot, 0).unwrap();

        // 40 mana plus one regen of 10 cannot pay 60.
        assert_eq!(engine.stalled_side(), Some(Side::Player));
        let before = engine.snapshot();
        assert!(matches!(
            engine.use_tool("heavy", Side::Player, 0),
            Err(Rejection::InsufficientMana { .. })
        ));
        assert_eq!(engine.snapshot(), before);

        engine.reset();
        assert!(engine.start(0));
        assert_eq!(engine.stalled_side(), None);
    }

    #[test]
    fn test_largest_accepted_values_resolve() {
        let big = Tool {
            id: "big".to_string(),
            name: "Big".to_string(),
            aliases: vec!["big".to_string()],
            category: crate::catalog::ToolCategory::Attack,
            mana_cost: MAX_UNITS,
            cooldown: MAX_UNITS,
            effects: vec![crate::catalog::Effect::Damage { amount: 1 }],
        };
        let catalog = Arc::new(ToolCatalog::from_tools(vec![big]).unwrap());
        let config = EngineConfig {
            starting_mana: MAX_UNITS,
            mana_regen: MAX_UNITS,
            ..EngineConfig::default()
        };
        config.validate().unwrap();
        let mut engine = CombatEngine::new(catalog, config);
        assert!(engine.start(0));

        engine.use_tool("big", Side::Player, 0).unwrap();
        let player = &engine.state().player;
        assert_eq!(player.mana.current, Fixed::ZERO);
        assert_eq!(whole_units(player.cooldown("big")), MAX_UNITS);

        engine.use_tool("big", Side::Bot, 0).unwrap();
        let player = &engine.state().player;
        assert_eq!(whole_units(player.mana.current), MAX_UNITS);
        assert_eq!(whole_units(player.cooldown("big")), MAX_UNITS - 1);
    }
}
