//! Manager operations on an installed instance.
//!
//! Each call authenticates on its own; nothing here waits on a running
//! worker.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use nocron_protocols::{
    EditError, InstanceStore, SettingsEdit, StatsSnapshot, StoreError, TaskSettings, log_line,
};

use crate::auth::AuthGate;
use crate::error::ControlError;
use crate::validate::{TaskCandidate, TaskValidator, ValidationError};

/// Default number of run-log lines returned by `stats`.
pub const DEFAULT_STATS_LOG_LINES: usize = 10;

/// A manager action name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerAction {
    Validate,
    Update,
    Pause,
    Resume,
    #[default]
    Stats,
    Kill,
}

impl ManagerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerAction::Validate => "validate",
            ManagerAction::Update => "update",
            ManagerAction::Pause => "pause",
            ManagerAction::Resume => "resume",
            ManagerAction::Stats => "stats",
            ManagerAction::Kill => "kill",
        }
    }
}

impl fmt::Display for ManagerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerAction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "validate" => Ok(ManagerAction::Validate),
            "update" => Ok(ManagerAction::Update),
            "pause" => Ok(ManagerAction::Pause),
            "resume" => Ok(ManagerAction::Resume),
            "stats" | "" => Ok(ManagerAction::Stats),
            "kill" => Ok(ManagerAction::Kill),
            _ => Err(ControlError::UnknownAction(s.to_string())),
        }
    }
}

/// Payload of a `stats` call.
#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub stats: StatsSnapshot,
    /// Most recent first.
    pub logs: Vec<String>,
    pub paused: bool,
    pub settings: TaskSettings,
    /// Advisory only; `None` before the first tick.
    pub next_run_in_seconds: Option<u64>,
}

/// What a successful manager call did.
#[derive(Debug, Clone)]
pub enum ControlOutcome {
    Valid(TaskSettings),
    Updated(TaskSettings),
    Paused,
    Resumed { was_paused: bool },
    Stats(Box<StatsView>),
    Killed,
}

impl ControlOutcome {
    pub fn message(&self) -> String {
        match self {
            ControlOutcome::Valid(_) => "Settings are valid".to_string(),
            ControlOutcome::Updated(settings) => format!(
                "Settings updated: {} every {}s for {}s windows",
                settings.kind, settings.interval_secs, settings.window_secs
            ),
            ControlOutcome::Paused => {
                "Pause requested; the worker stops at its next tick".to_string()
            }
            ControlOutcome::Resumed { was_paused: true } => {
                "Resumed; trigger the worker to start it again".to_string()
            }
            ControlOutcome::Resumed { was_paused: false } => "Not paused".to_string(),
            ControlOutcome::Stats(_) => "Stats loaded".to_string(),
            ControlOutcome::Killed => "Instance killed".to_string(),
        }
    }

    /// Structured data for the response envelope, if any.
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            ControlOutcome::Valid(settings) | ControlOutcome::Updated(settings) => {
                serde_json::to_value(settings).ok()
            }
            ControlOutcome::Stats(view) => serde_json::to_value(view.as_ref()).ok(),
            _ => None,
        }
    }
}

/// Authenticated manager operations.
#[derive(Clone)]
pub struct ControlPlane {
    store: Arc<dyn InstanceStore>,
    gate: AuthGate,
    stats_log_lines: usize,
}

impl ControlPlane {
    pub fn new(store: Arc<dyn InstanceStore>) -> Self {
        Self {
            gate: AuthGate::new(store.clone()),
            store,
            stats_log_lines: DEFAULT_STATS_LOG_LINES,
        }
    }

    pub fn with_stats_log_lines(mut self, lines: usize) -> Self {
        self.stats_log_lines = lines;
        self
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Authenticate, then run `action`.
    pub async fn execute(
        &self,
        suffix: &str,
        token: Option<&str>,
        action: ManagerAction,
        candidate: TaskCandidate,
    ) -> Result<ControlOutcome, ControlError> {
        let instance = self.gate.authorize(suffix, token).await?;
        let suffix = instance.suffix();

        match action {
            ManagerAction::Validate => {
                let settings = TaskValidator::validate(&candidate)?;
                Ok(ControlOutcome::Valid(settings))
            }
            ManagerAction::Update => {
                // Merge against the stored settings under the task lock so
                // concurrent partial updates cannot undo each other.
                let edit: SettingsEdit = Box::new(
                    move |current: &TaskSettings| -> Result<TaskSettings, EditError> {
                        Ok(TaskValidator::validate(&candidate.merged_with(current))?)
                    },
                );
                let updated = self
                    .store
                    .update_task(suffix, edit)
                    .await
                    .map_err(|e| match e {
                        StoreError::Rejected(reason) => match reason.downcast::<ValidationError>() {
                            Ok(violation) => ControlError::Validation(*violation),
                            Err(other) => ControlError::Store(StoreError::Rejected(other)),
                        },
                        other => ControlError::Store(other),
                    })?;
                let settings = updated.settings;
                info!(
                    suffix,
                    interval = settings.interval_secs,
                    window = settings.window_secs,
                    "Task settings updated"
                );
                self.append_log(
                    suffix,
                    &format!(
                        "Settings updated: taskType={}, interval={}, window={}",
                        settings.kind, settings.interval_secs, settings.window_secs
                    ),
                )
                .await;
                Ok(ControlOutcome::Updated(settings))
            }
            ManagerAction::Pause => {
                self.store.raise_pause(suffix).await?;
                info!(suffix, "Pause requested");
                Ok(ControlOutcome::Paused)
            }
            ManagerAction::Resume => {
                let was_paused = self.store.is_paused(suffix).await?;
                self.store.clear_pause(suffix).await?;
                if was_paused {
                    info!(suffix, "Pause cleared");
                }
                Ok(ControlOutcome::Resumed { was_paused })
            }
            ManagerAction::Stats => {
                let view = self.stats_view(instance.task().settings.clone(), suffix).await?;
                Ok(ControlOutcome::Stats(Box::new(view)))
            }
            ManagerAction::Kill => {
                self.store.destroy(suffix).await?;
                info!(suffix, "Instance killed");
                Ok(ControlOutcome::Killed)
            }
        }
    }

    /// The change is already committed; a lost run-log line must not turn it
    /// into a reported failure.
    async fn append_log(&self, suffix: &str, message: &str) {
        if let Err(e) = self
            .store
            .append_log(suffix, &log_line(Utc::now(), message))
            .await
        {
            warn!(suffix, error = %e, "Run log not written");
        }
    }

    async fn stats_view(
        &self,
        settings: TaskSettings,
        suffix: &str,
    ) -> Result<StatsView, ControlError> {
        let stats = self.store.load_stats(suffix).await?;
        let logs = self.store.recent_logs(suffix, self.stats_log_lines).await?;
        let paused = self.store.is_paused(suffix).await?;
        let next_run_in_seconds = stats.next_run_in_seconds(settings.interval_secs, Utc::now());

        Ok(StatsView {
            stats,
            logs,
            paused,
            settings,
            next_run_in_seconds,
        })
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
