//! Proptest strategies.
//!
//! These generate random but reproducible action scripts for property tests
//! of the engine's invariants and determinism.

use duel_core::combatant::Side;
use duel_core::config::{EngineConfig, TimingMode};
use proptest::prelude::*;

use crate::script::ScriptStep;

/// Free text a caster might submit: standard aliases in odd casing and
/// spacing, plus text that matches nothing.
pub const SAMPLE_INPUTS: &[&str] = &[
    "fireball",
    "FIRE  BALL",
    "fb",
    "lightning",
    "zap",
    "frost",
    "drain",
    "strike",
    "hit",
    "heal",
    "shield",
    "  Barrier ",
    "dodge",
    "roll",
    "teleport",
    "",
];

/// Either side.
pub fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Player), Just(Side::Bot)]
}

/// One of [`SAMPLE_INPUTS`].
pub fn arb_input() -> impl Strategy<Value = String> {
    proptest::sample::select(SAMPLE_INPUTS).prop_map(str::to_string)
}

/// Cast or clock advance. Waits stay short so real-time cooldowns matter.
pub fn arb_step() -> impl Strategy<Value = ScriptStep> {
    prop_oneof![
        4 => (arb_side(), arb_input()).prop_map(|(side, input)| ScriptStep::Cast { side, input }),
        1 => (0u64..2_500).prop_map(|ms| ScriptStep::Wait { ms }),
    ]
}

/// Scripts of up to `max_len` steps.
pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<ScriptStep>> {
    proptest::collection::vec(arb_step(), 0..max_len)
}

/// Engine configs across both modes, dodge settings and shield caps.
pub fn arb_engine_config() -> impl Strategy<Value = EngineConfig> {
    (
        prop_oneof![Just(TimingMode::TurnBased), Just(TimingMode::RealTime)],
        any::<bool>(),
        proptest::option::of(20u32..120),
        arb_side(),
    )
        .prop_map(|(mode, dodging, shield_cap, first_turn)| EngineConfig {
            mode,
            dodging_enabled: dodging,
            shield_cap,
            first_turn,
            ..EngineConfig::default()
        })
}
