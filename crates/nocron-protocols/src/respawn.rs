//! Respawn protocol.
//!
//! When an invocation's window closes, the scheduler asks a [`Respawner`] to
//! start the next invocation of the same instance.

use std::fmt;

use async_trait::async_trait;

use crate::error::RespawnError;

/// How the next invocation acknowledged the hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnAck {
    /// The worker entry answered with a success status.
    Accepted,
    /// The worker entry accepted the connection and is still running its window.
    Running,
    /// Queued on the in-process relay.
    Queued,
}

impl fmt::Display for RespawnAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespawnAck::Accepted => f.write_str("accepted"),
            RespawnAck::Running => f.write_str("running"),
            RespawnAck::Queued => f.write_str("queued"),
        }
    }
}

#[async_trait]
pub trait Respawner: Send + Sync {
    /// Start the next invocation for `suffix`, presenting `secret`.
    async fn respawn(&self, suffix: &str, secret: &str) -> Result<RespawnAck, RespawnError>;
}
