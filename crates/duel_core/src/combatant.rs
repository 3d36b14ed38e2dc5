//! Per-side combat state.
//!
//! A [`Combatant`] holds everything the engine mutates for one side of the
//! duel. All mutators clamp: health and mana stay in `[0, max]`, shield and
//! cooldowns never go negative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_map_serde, fixed_serde, saturating_decay, units, Fixed};

/// Which side of the duel an entity is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The human-controlled entity.
    Player,
    /// The AI-controlled entity.
    Bot,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Bot,
            Self::Bot => Self::Player,
        }
    }

    /// Lowercase label for logs and wire formats.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Health pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health at full.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the entity is down (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }

    /// Heal, returning the actual amount healed.
    /// Uses saturating addition to prevent overflow.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let headroom = self.max.saturating_sub(self.current);
        let actual = amount.min(headroom);
        self.current = self.current.saturating_add(actual);
        actual
    }
}

/// Mana pool. Fractional under real-time regen, so fixed-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mana {
    /// Current mana.
    #[serde(with = "fixed_serde")]
    pub current: Fixed,
    /// Maximum mana.
    #[serde(with = "fixed_serde")]
    pub max: Fixed,
}

impl Mana {
    /// Create a full mana pool.
    #[must_use]
    pub fn new(max: u32) -> Self {
        let max = units(max);
        Self { current: max, max }
    }

    /// Whether at least `cost` mana is available.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.current >= units(cost)
    }

    /// Deduct `cost`, flooring at zero.
    pub fn spend(&mut self, cost: u32) {
        self.current = saturating_decay(self.current, units(cost));
    }

    /// Add `amount`, capped at max. Returns the amount actually gained.
    pub fn restore(&mut self, amount: Fixed) -> Fixed {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max).max(Fixed::ZERO);
        self.current - before
    }
}

/// Full combat state for one side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combatant {
    /// Which side this is.
    pub side: Side,
    /// Health pool.
    pub health: Health,
    /// Mana pool.
    pub mana: Mana,
    /// Absorption pool, consumed before health.
    pub shield: u32,
    /// Remaining cooldown per tool id, in turns or seconds.
    ///
    /// Entries at zero are removed, so iteration only shows active cooldowns.
    #[serde(with = "fixed_map_serde")]
    pub cooldowns: BTreeMap<String, Fixed>,
    /// One-shot dodge flag; nullifies the next incoming damage effect.
    pub dodging: bool,
    /// Match time of the last real-time regen pulse.
    pub last_regen_ms: u64,
}

impl Combatant {
    /// Fresh combatant at full health and mana.
    #[must_use]
    pub fn new(side: Side, max_health: u32, max_mana: u32) -> Self {
        Self {
            side,
            health: Health::new(max_health),
            mana: Mana::new(max_mana),
            shield: 0,
            cooldowns: BTreeMap::new(),
            dodging: false,
            last_regen_ms: 0,
        }
    }

    /// Remaining cooldown for a tool (zero when ready).
    #[must_use]
    pub fn cooldown(&self, tool_id: &str) -> Fixed {
        self.cooldowns.get(tool_id).copied().unwrap_or(Fixed::ZERO)
    }

    /// Whether the tool's cooldown has run out.
    #[must_use]
    pub fn is_ready(&self, tool_id: &str) -> bool {
        self.cooldown(tool_id) <= Fixed::ZERO
    }

    /// Start a cooldown for a tool.
    pub fn start_cooldown(&mut self, tool_id: &str, length: u32) {
        if length == 0 {
            self.cooldowns.remove(tool_id);
        } else {
            self.cooldowns.insert(tool_id.to_string(), units(length));
        }
    }

    /// Reduce every active cooldown by `amount`, floored at zero.
    pub fn decay_cooldowns(&mut self, amount: Fixed) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = saturating_decay(*remaining, amount);
        }
        self.cooldowns.retain(|_, remaining| *remaining > Fixed::ZERO);
    }

    /// Add to the shield pool, optionally capped.
    ///
    /// Returns the amount actually added.
    pub fn add_shield(&mut self, amount: u32, cap: Option<u32>) -> u32 {
        let before = self.shield;
        let raised = self.shield.saturating_add(amount);
        self.shield = cap.map_or(raised, |cap| raised.min(cap.max(before)));
        self.shield - before
    }

    /// Whether this combatant is out of the fight.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.health.is_dead()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Bot);
        assert_eq!(Side::Bot.opponent(), Side::Player);
        assert_eq!(Side::Bot.to_string(), "bot");
    }

    #[test]
    fn test_health_clamps() {
        let mut health = Health::new(100);
        assert_eq!(health.apply_damage(30), 30);
        assert_eq!(health.heal(50), 30);
        assert_eq!(health.current, 100);
        assert_eq!(health.apply_damage(250), 100);
        assert!(health.is_dead());
    }

    #[test]
    fn test_mana_spend_and_restore() {
        let mut mana = Mana::new(100);
        assert!(mana.can_afford(100));
        mana.spend(30);
        assert_eq!(mana.current, Fixed::from_num(70));
        assert!(!mana.can_afford(71));
        assert_eq!(mana.restore(Fixed::from_num(50)), Fixed::from_num(30));
        assert_eq!(mana.current, mana.max);
    }

    #[test]
    fn test_cooldown_lifecycle() {
        let mut c = Combatant::new(Side::Player, 100, 100);
        assert!(c.is_ready("fireball"));
        c.start_cooldown("fireball", 3);
        assert_eq!(c.cooldown("fireball"), Fixed::from_num(3));
        c.decay_cooldowns(Fixed::from_num(2));
        assert!(!c.is_ready("fireball"));
        c.decay_cooldowns(Fixed::from_num(5));
        assert!(c.is_ready("fireball"));
        assert!(c.cooldowns.is_empty());
    }

    #[test]
    fn test_zero_length_cooldown_is_ready() {
        let mut c = Combatant::new(Side::Bot, 100, 100);
        c.start_cooldown("strike", 0);
        assert!(c.is_ready("strike"));
    }

    #[test]
    fn test_shield_stacks_and_caps() {
        let mut c = Combatant::new(Side::Player, 100, 100);
        assert_eq!(c.add_shield(30, None), 30);
        assert_eq!(c.add_shield(30, None), 30);
        assert_eq!(c.shield, 60);
        assert_eq!(c.add_shield(30, Some(70)), 10);
        assert_eq!(c.shield, 70);
        assert_eq!(c.add_shield(30, Some(70)), 0);
    }
}
