//! # Duel AI
//!
//! Bot opponent for duel matches.
//!
//! - [`policy`] - the fixed-priority decision heuristic
//! - [`controller`] - think delays, the "already deciding" latch and the
//!   real-time re-arm loop
//!
//! The bot sees and acts through [`duel_core::facade::PlayerFacade`] only,
//! so it is bound by exactly the validation a human player is. All
//! randomness comes from a seeded [`rand_chacha::ChaCha8Rng`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod controller;
pub mod policy;

pub use controller::{BotController, BotPoll, BotTiming};
pub use policy::{decide, Decision, DecisionRule, PolicyConfig};
