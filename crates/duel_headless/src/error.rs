//! Error types for the headless runner.

use duel_core::error::GameError;
use thiserror::Error;

/// Result type alias using [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Failures while reading commands or setting up a run.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Input was not valid JSON or not a known command.
    #[error("Invalid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A response could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog or engine config failed to load.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A batch or runner config file could not be parsed.
    #[error("Failed to parse config '{path}': {message}")]
    Config {
        /// File that failed.
        path: String,
        /// Parser message.
        message: String,
    },
}
