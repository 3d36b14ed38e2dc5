//! Cloneable handle for issuing commands to a match worker.
//!
//! [`MatchHandle`] hides the channel plumbing. Every method is one
//! command/reply round trip, so actions from different holders are applied
//! in the order the worker receives them.

use duel_core::combatant::Side;
use duel_core::result::ActionResult;
use duel_core::state::MatchState;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::{HostError, Result};
use crate::event::MatchEvent;
use crate::worker::Command;

/// Client-facing handle to one hosted match.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<MatchEvent>,
}

impl MatchHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<MatchEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| HostError::CommandChannelClosed)?;
        reply_rx.await.map_err(HostError::ReplyChannelClosed)
    }

    /// Submit typed text on behalf of the human player.
    pub async fn use_tool(&self, input: &str) -> Result<ActionResult> {
        self.use_tool_as(Side::Player, input).await
    }

    /// Submit typed text on behalf of either side.
    pub async fn use_tool_as(&self, side: Side, input: &str) -> Result<ActionResult> {
        let input = input.to_string();
        self.request(|reply| Command::UseTool { side, input, reply })
            .await
    }

    /// Current observation snapshot.
    pub async fn snapshot(&self) -> Result<MatchState> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Throw the match away and start a fresh one.
    pub async fn reset(&self) -> Result<MatchState> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// Stop the worker. Later requests fail with
    /// [`HostError::CommandChannelClosed`].
    pub async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| HostError::CommandChannelClosed)
    }

    /// Subscribe to match events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.event_tx.subscribe()
    }
}
