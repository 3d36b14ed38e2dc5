//! Fixed-point math utilities for deterministic resource accounting.
//!
//! Mana and cooldowns can become fractional under real-time decay. They use
//! fixed-point arithmetic so that two hosts replaying the same inputs land
//! on bit-identical values.

use fixed::types::I32F32;

/// Fixed-point number type for mana and cooldown math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Milliseconds per second, as used by real-time decay.
pub const MILLIS_PER_SECOND: u64 = 1000;

/// Largest whole number a [`Fixed`] holds. Mana and cooldown values in
/// catalogs and configs must not exceed it.
pub const MAX_UNITS: u32 = 0x7FFF_FFFF;

/// Whole units as a fixed value, saturating at [`MAX_UNITS`].
#[must_use]
pub fn units(value: u32) -> Fixed {
    Fixed::saturating_from_num(value)
}

/// Convert a millisecond span into fractional seconds.
#[must_use]
pub fn seconds_from_millis(millis: u64) -> Fixed {
    let whole = millis / MILLIS_PER_SECOND;
    let rem = millis % MILLIS_PER_SECOND;
    let whole = i32::try_from(whole).unwrap_or(i32::MAX);
    Fixed::from_num(whole) + Fixed::from_num(rem) / Fixed::from_num(MILLIS_PER_SECOND)
}

/// Subtract `amount` from `value`, flooring the result at zero.
#[must_use]
pub fn saturating_decay(value: Fixed, amount: Fixed) -> Fixed {
    (value - amount).max(Fixed::ZERO)
}

/// Whole units contained in a non-negative fixed value (floor).
#[must_use]
pub fn whole_units(value: Fixed) -> u32 {
    if value <= Fixed::ZERO {
        0
    } else {
        value.to_num::<i64>().clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Whole units needed to cover a non-negative fixed value (ceiling).
#[must_use]
pub fn ceil_units(value: Fixed) -> u32 {
    let floor = whole_units(value);
    if value > units(floor) {
        floor.saturating_add(1)
    } else {
        floor
    }
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for maps from tool id to a fixed-point value.
pub mod fixed_map_serde {
    use std::collections::BTreeMap;

    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize each value as its raw bit representation.
    pub fn serialize<S>(value: &BTreeMap<String, Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bits: BTreeMap<&String, i64> = value.iter().map(|(k, v)| (k, v.to_bits())).collect();
        bits.serialize(serializer)
    }

    /// Deserialize raw bit representations back into fixed-point values.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = BTreeMap::<String, i64>::deserialize(deserializer)?;
        Ok(bits
            .into_iter()
            .map(|(k, v)| (k, Fixed::from_bits(v)))
            .collect())
    }
}
