//! # Duel Match Host
//!
//! Runs matches authoritatively. Each match is owned by one tokio task
//! ([`worker::MatchWorker`]) that serializes player actions, bot actions
//! and real-time ticks against a single [`duel_core::engine::CombatEngine`].
//! Callers talk to it through a cloneable [`handle::MatchHandle`] and watch
//! it through a broadcast of [`event::MatchEvent`]s.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod render;
pub mod worker;

pub use config::ServerConfig;
pub use error::{HostError, Result};
pub use event::MatchEvent;
pub use handle::MatchHandle;
pub use worker::spawn_match;
