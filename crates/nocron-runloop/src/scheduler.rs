//! The windowed worker loop.
//!
//! One call to [`SchedulerLoop::invoke`] is one worker invocation. It ticks
//! every `interval` seconds while less than `window` seconds have passed
//! since it started, then asks the [`Respawner`] to start the next one.
//!
//! The pause signal is the only way to end the chain: it is checked at the
//! start of every tick and, when present, the invocation stops without a
//! hand-off. A task that disappears (kill) stops the loop the same way.
//! Nothing interrupts a tick or a sleep in flight.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use nocron_core::{AuthGate, AuthorizedInstance};
use nocron_protocols::{
    InstanceStore, RespawnAck, RespawnError, Respawner, TaskDefinition, TaskExecutor, TickOutcome,
    TickRecord, log_line,
};

use crate::error::RunLoopError;

/// How an invocation ended.
#[derive(Debug)]
pub enum LoopOutcome {
    /// The window closed; the hand-off was attempted once.
    WindowElapsed {
        ticks: u64,
        respawn: Result<RespawnAck, RespawnError>,
    },
    /// A pause request was honoured. No hand-off.
    Paused { ticks: u64 },
    /// The task record vanished or became unreadable. No hand-off.
    Removed { ticks: u64 },
}

impl LoopOutcome {
    pub fn ticks(&self) -> u64 {
        match self {
            LoopOutcome::WindowElapsed { ticks, .. }
            | LoopOutcome::Paused { ticks }
            | LoopOutcome::Removed { ticks } => *ticks,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoopOutcome::WindowElapsed { .. } => "window_elapsed",
            LoopOutcome::Paused { .. } => "paused",
            LoopOutcome::Removed { .. } => "removed",
        }
    }

    /// Whether the next invocation was handed off successfully.
    pub fn respawned(&self) -> bool {
        matches!(self, LoopOutcome::WindowElapsed { respawn: Ok(_), .. })
    }
}

/// Runs worker invocations.
#[derive(Clone)]
pub struct SchedulerLoop {
    store: Arc<dyn InstanceStore>,
    gate: AuthGate,
    executor: Arc<dyn TaskExecutor>,
    respawner: Arc<dyn Respawner>,
}

impl SchedulerLoop {
    pub fn new(
        store: Arc<dyn InstanceStore>,
        executor: Arc<dyn TaskExecutor>,
        respawner: Arc<dyn Respawner>,
    ) -> Self {
        Self {
            gate: AuthGate::new(store.clone()),
            store,
            executor,
            respawner,
        }
    }

    /// Authenticate, then run one invocation to its end.
    pub async fn invoke(
        &self,
        suffix: &str,
        token: Option<&str>,
    ) -> Result<LoopOutcome, RunLoopError> {
        let instance = self.gate.authorize(suffix, token).await?;
        Ok(self.run(instance).await)
    }

    /// Run one invocation for an already authorized instance.
    pub async fn run(&self, instance: AuthorizedInstance) -> LoopOutcome {
        let task = instance.into_task();
        let suffix = task.suffix.clone();
        let secret = task.secret.clone();
        let window = Duration::from_secs(task.window_secs());
        let started = Instant::now();
        let mut ticks = 0u64;

        info!(
            suffix = %suffix,
            kind = %task.kind(),
            interval = task.interval_secs(),
            window = task.window_secs(),
            "Worker invocation started"
        );

        while started.elapsed() < window {
            if self.pause_requested(&suffix).await {
                info!(suffix = %suffix, ticks, "Worker stopped gracefully");
                self.append_log(&suffix, "Stopped gracefully (paused)").await;
                return LoopOutcome::Paused { ticks };
            }

            // Reload every tick so updates apply from the next tick on.
            let task = match self.store.load_task(&suffix).await {
                Ok(Some(task)) => task,
                Ok(None) => {
                    info!(suffix = %suffix, ticks, "Task removed, worker stopping");
                    return LoopOutcome::Removed { ticks };
                }
                Err(e) => {
                    warn!(suffix = %suffix, error = %e, "Task record unreadable, worker stopping");
                    return LoopOutcome::Removed { ticks };
                }
            };

            self.tick(&task).await;
            ticks += 1;

            sleep(Duration::from_secs(task.interval_secs())).await;
        }

        let respawn = self.respawner.respawn(&suffix, &secret).await;
        match &respawn {
            Ok(ack) => {
                info!(suffix = %suffix, ticks, %ack, "Window closed, next invocation handed off");
                self.append_log(
                    &suffix,
                    &format!("Window closed after {} ticks; respawn {}", ticks, ack),
                )
                .await;
            }
            Err(e) => {
                warn!(suffix = %suffix, ticks, error = %e, "Window closed, respawn failed");
                self.append_log(
                    &suffix,
                    &format!("Window closed after {} ticks; respawn failed: {}", ticks, e),
                )
                .await;
            }
        }

        LoopOutcome::WindowElapsed { ticks, respawn }
    }

    /// Execute once and account for it. Never fails.
    async fn tick(&self, task: &TaskDefinition) {
        let outcome = match self.executor.execute(task).await {
            Ok(output) => TickOutcome::Success {
                detail: output.summary,
            },
            Err(fault) => {
                debug!(suffix = %task.suffix, error = %fault, "Task tick failed");
                TickOutcome::Failure {
                    reason: fault.to_string(),
                }
            }
        };
        let record = TickRecord::new(Utc::now(), task.interval_secs(), outcome);

        if let Err(e) = self.store.record_tick(&task.suffix, &record).await {
            warn!(suffix = %task.suffix, error = %e, "Failed to record tick");
        }
        if let Err(e) = self.store.append_log(&task.suffix, &record.log_line()).await {
            warn!(suffix = %task.suffix, error = %e, "Failed to append run log");
        }
    }

    async fn pause_requested(&self, suffix: &str) -> bool {
        match self.store.consume_pause(suffix).await {
            Ok(paused) => paused,
            Err(e) => {
                warn!(suffix, error = %e, "Pause signal unreadable, continuing");
                false
            }
        }
    }

    async fn append_log(&self, suffix: &str, message: &str) {
        if let Err(e) = self
            .store
            .append_log(suffix, &log_line(Utc::now(), message))
            .await
        {
            debug!(suffix, error = %e, "Run log not written");
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
