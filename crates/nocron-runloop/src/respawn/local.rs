//! In-process hand-off for a long-lived server.
//!
//! The respawner queues the next invocation on a channel; the relay task
//! drains it and starts each invocation on its own task. The loop's pause,
//! kill and update semantics are unchanged because every queued invocation
//! still authenticates and reloads its task.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use nocron_protocols::{RespawnAck, RespawnError, Respawner};

use crate::scheduler::SchedulerLoop;

/// A queued worker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub suffix: String,
    pub secret: String,
}

/// Queues the next invocation on the relay channel.
#[derive(Debug, Clone)]
pub struct LocalRespawner {
    sender: mpsc::UnboundedSender<Invocation>,
}

impl LocalRespawner {
    /// A respawner plus the receiving end the relay drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Invocation>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Respawner for LocalRespawner {
    async fn respawn(&self, suffix: &str, secret: &str) -> Result<RespawnAck, RespawnError> {
        self.sender
            .send(Invocation {
                suffix: suffix.to_string(),
                secret: secret.to_string(),
            })
            .map_err(|_| RespawnError::RelayClosed)?;
        Ok(RespawnAck::Queued)
    }
}

/// Background task that starts queued invocations.
pub struct LocalRelay {
    handle: JoinHandle<()>,
}

impl LocalRelay {
    /// Start draining `receiver` into `scheduler`.
    pub fn spawn(
        scheduler: SchedulerLoop,
        mut receiver: mpsc::UnboundedReceiver<Invocation>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            info!("Local respawn relay started");
            while let Some(invocation) = receiver.recv().await {
                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    let suffix = invocation.suffix;
                    match scheduler.invoke(&suffix, Some(&invocation.secret)).await {
                        Ok(outcome) => {
                            debug!(suffix = %suffix, outcome = outcome.label(), "Relayed invocation finished")
                        }
                        Err(e) => warn!(suffix = %suffix, error = %e, "Relayed invocation refused"),
                    }
                });
            }
            info!("Local respawn relay stopped");
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop accepting invocations. Running ones are not interrupted.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
