//! Headless duel runner for scripted play and balance testing.
//!
//! Two ways to drive matches without a terminal UI:
//!
//! - **Protocol runner**: JSON commands on stdin, responses on stdout. The
//!   caller plays the player side; the bot plays through its controller on a
//!   virtual clock.
//! - **Batch runner**: many seeded bot-vs-bot matches in parallel, reduced to
//!   per-match metrics and a summary.
//!
//! Logs always go to stderr so stdout stays machine-readable.
//!
//! # Example
//!
//! ```bash
//! echo '{"cmd":"use_tool","input":"fireball"}' | cargo run -p duel_headless
//! cargo run -p duel_headless -- batch --count 1000 --mode real-time
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use std::path::Path;
use std::sync::Arc;

use duel_core::catalog::ToolCatalog;

pub mod batch;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod runner;

pub use batch::{run_batch, run_match, BatchConfig, BatchResults};
pub use error::{ProtocolError, Result};
pub use metrics::{BatchSummary, MatchMetrics, SideMetrics};
pub use protocol::{Command, Response, WireMode};
pub use runner::{HeadlessConfig, HeadlessRunner};

/// Load a catalog from `path`, or the embedded standard catalog.
pub fn load_catalog(path: Option<&Path>) -> Result<Arc<ToolCatalog>> {
    let catalog = match path {
        Some(path) => ToolCatalog::load(path)?,
        None => ToolCatalog::standard()?,
    };
    Ok(Arc::new(catalog))
}
