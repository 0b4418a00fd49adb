//! Run statistics and tick records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters for one instance.
///
/// Every field defaults so a truncated or older record still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub total_runs: u64,
    #[serde(default)]
    pub total_loops: u64,
    #[serde(default)]
    pub total_success: u64,
    #[serde(default)]
    pub total_fails: u64,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    /// Advisory countdown text, recomputed each tick.
    #[serde(default)]
    pub next_run: Option<String>,
}

impl StatsSnapshot {
    /// Fold one completed tick into the counters.
    pub fn apply(&mut self, tick: &TickRecord) {
        self.total_loops += 1;
        self.total_runs += 1;
        if tick.outcome.is_success() {
            self.total_success += 1;
        } else {
            self.total_fails += 1;
        }
        self.last_run = Some(tick.at);
        self.next_run = Some(format_interval(tick.interval_secs));
    }

    /// Seconds until the next tick, assuming the loop is still running.
    ///
    /// Display-only: overlapping invocations make this disagree between
    /// instances, so nothing schedules off it.
    pub fn next_run_in_seconds(&self, interval_secs: u64, now: DateTime<Utc>) -> Option<u64> {
        let last = self.last_run?;
        let interval = chrono::Duration::try_seconds(i64::try_from(interval_secs).ok()?)?;
        let due = last.checked_add_signed(interval)?;
        Some((due - now).num_seconds().max(0) as u64)
    }
}

/// Result of a single task execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickOutcome {
    Success { detail: String },
    Failure { reason: String },
}

impl TickOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TickOutcome::Success { .. })
    }
}

/// What the scheduler hands to the stats store after each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickRecord {
    pub at: DateTime<Utc>,
    pub interval_secs: u64,
    pub outcome: TickOutcome,
}

impl TickRecord {
    pub fn new(at: DateTime<Utc>, interval_secs: u64, outcome: TickOutcome) -> Self {
        Self {
            at,
            interval_secs,
            outcome,
        }
    }

    /// The run-log line for this tick.
    pub fn log_line(&self) -> String {
        match &self.outcome {
            TickOutcome::Success { detail } => log_line(self.at, &format!("Run OK: {}", detail)),
            TickOutcome::Failure { reason } => log_line(self.at, &format!("Run FAILED: {}", reason)),
        }
    }
}

/// Format a run-log line with its timestamp prefix.
pub fn log_line(at: DateTime<Utc>, message: &str) -> String {
    format!("[{}] {}", at.format("%Y-%m-%dT%H:%M:%SZ"), message)
}

/// Break a second count into `d`/`h`/`m`/`s` parts, dropping zero parts.
pub fn format_interval(total_secs: u64) -> String {
    if total_secs == 0 {
        return "0s".to_string();
    }

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect::<Vec<_>>()
        .join(" ")
}
