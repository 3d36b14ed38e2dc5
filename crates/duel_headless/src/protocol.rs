//! JSON protocol for headless play.
//!
//! The runner talks in JSON lines (one JSON object per line):
//!
//! **Input (stdin):** commands from a script or an external agent
//! **Output (stdout):** responses and state
//!
//! The runner drives the bot side itself on a virtual clock. Time only moves
//! when a `tick` command asks for it, except that in turn-based matches the
//! clock jumps over the bot's think delay so the caller gets the turn back
//! in the same response batch.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","mode":"turn_based","time_ms":0}
//! -> {"cmd":"use_tool","input":"Fire Ball"}
//! <- {"type":"action","record":{"actor":"Player","tool_id":"fireball",...}}
//! <- {"type":"action","record":{"actor":"Bot","tool_id":"lightning",...}}
//! -> {"cmd":"hash"}
//! <- {"type":"state_hash","time_ms":1043,"hash":1234567890}
//! -> {"cmd":"quit"}
//! <- {"type":"bye"}
//! ```

use duel_core::combatant::Side;
use duel_core::config::TimingMode;
use duel_core::result::{ActionRecord, Rejection};
use duel_core::state::{MatchOutcome, MatchState};
use serde::{Deserialize, Serialize};

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (caller -> runner)
// ============================================================================

/// Timing mode as spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireMode {
    /// Alternating turns.
    TurnBased,
    /// Continuous time.
    RealTime,
}

impl From<WireMode> for TimingMode {
    fn from(mode: WireMode) -> Self {
        match mode {
            WireMode::TurnBased => Self::TurnBased,
            WireMode::RealTime => Self::RealTime,
        }
    }
}

impl From<TimingMode> for WireMode {
    fn from(mode: TimingMode) -> Self {
        match mode {
            TimingMode::TurnBased => Self::TurnBased,
            TimingMode::RealTime => Self::RealTime,
        }
    }
}

/// Commands accepted by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Throw away the current match and start a new one. Omitted fields keep
    /// the values of the previous match.
    NewMatch {
        #[serde(default)]
        mode: Option<WireMode>,
        #[serde(default)]
        dodging: Option<bool>,
        #[serde(default)]
        seed: Option<u64>,
    },

    /// Submit free text for the player side.
    UseTool { input: String },

    /// Advance the virtual clock by `ms` milliseconds (default: one step).
    Tick {
        #[serde(default)]
        ms: Option<u64>,
    },

    /// Report the current state without advancing time.
    Query,

    /// Report the state hash (for determinism checks).
    Hash,

    /// Stop the runner.
    Quit,
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Command name for error replies.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewMatch { .. } => "new_match",
            Self::UseTool { .. } => "use_tool",
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

// ============================================================================
// Output Responses (runner -> caller)
// ============================================================================

/// Responses written by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A match has started and commands are accepted.
    Ready {
        version: String,
        mode: WireMode,
        time_ms: u64,
    },

    /// A tool resolved, for either side.
    Action { record: ActionRecord },

    /// A submission was refused. Nothing changed.
    Rejected {
        side: Side,
        input: String,
        message: String,
        rejection: Rejection,
    },

    /// Full match state.
    State { time_ms: u64, state: MatchState },

    /// State hash for determinism verification.
    StateHash { time_ms: u64, hash: u64 },

    /// The side holding the turn has nothing usable. The turn-based match
    /// cannot continue until a `new_match`. Sent once per match.
    Stalled { side: Side, turns: u64, time_ms: u64 },

    /// The match ended. Sent once per match.
    GameOver {
        outcome: MatchOutcome,
        winner: Option<Side>,
        turns: u64,
        time_ms: u64,
    },

    /// A command could not be processed.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Goodbye before shutdown.
    Bye,
}

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(mode: TimingMode, time_ms: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            mode: mode.into(),
            time_ms,
        }
    }

    /// Create a rejection response.
    #[must_use]
    pub fn rejected(side: Side, input: &str, rejection: Rejection) -> Self {
        Self::Rejected {
            side,
            input: input.to_string(),
            message: rejection.to_string(),
            rejection,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to a JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}","cmd":null}}"#)
        });
        json.push('\n');
        json
    }
}
