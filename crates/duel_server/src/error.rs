//! Host error types.

use thiserror::Error;
use tokio::sync::oneshot;

/// Result alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;

/// Failures talking to a match worker or preparing one.
#[derive(Debug, Error)]
pub enum HostError {
    /// The worker has stopped accepting commands.
    #[error("match worker command channel closed")]
    CommandChannelClosed,

    /// The worker dropped a reply.
    #[error("match worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    /// The worker task failed.
    #[error("match worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    /// Config or catalog could not be loaded.
    #[error(transparent)]
    Game(#[from] duel_core::error::GameError),

    /// Terminal IO failed.
    #[error("terminal io failed: {0}")]
    Io(#[from] std::io::Error),
}
