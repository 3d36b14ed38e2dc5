//! # Duel Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture catalogs and started engines
//! - Invariant assertions over match state
//! - Scripted action runs and a determinism harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod invariants;
pub mod script;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
