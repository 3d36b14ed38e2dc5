//! Error types for catalog and configuration loading.
//!
//! These are programmer or data errors: a broken catalog means a broken
//! build, not a normal game event. Expected gameplay failures live in
//! [`crate::result::Rejection`] instead.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for data integrity and loading failures.
#[derive(Debug, Error)]
pub enum GameError {
    /// Two catalog entries share an identifier.
    #[error("Duplicate tool id: {0}")]
    DuplicateToolId(String),

    /// Two catalog entries share a normalized alias.
    #[error("Alias '{alias}' is claimed by both '{first}' and '{second}'")]
    DuplicateAlias {
        /// The normalized alias.
        alias: String,
        /// Tool that registered the alias first.
        first: String,
        /// Tool that tried to register it again.
        second: String,
    },

    /// A tool has no aliases, so free text can never resolve to it.
    #[error("Tool '{0}' has no aliases")]
    MissingAliases(String),

    /// A tool has an empty effect list.
    #[error("Tool '{0}' has no effects")]
    MissingEffects(String),

    /// A mana or cooldown value is too large for fixed-point accounting.
    #[error("'{owner}' sets {field} to {value}, above the limit of {limit}")]
    ValueOutOfRange {
        /// Tool id, or `config` for engine settings.
        owner: String,
        /// Offending field.
        field: &'static str,
        /// Value as loaded.
        value: u32,
        /// Largest accepted value.
        limit: u32,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Reading a data file failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Engine configuration is not usable.
    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),
}
