//! Task definition types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Instance suffixes are 3-20 ASCII alphanumerics.
pub fn is_valid_suffix(suffix: &str) -> bool {
    (3..=20).contains(&suffix.len()) && suffix.chars().all(|c| c.is_ascii_alphanumeric())
}

/// What a tick does with the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Payload is code, run by a sandboxed executor.
    #[serde(rename = "code", alias = "php")]
    Code,
    /// Payload is a URL, fetched with a GET.
    #[serde(rename = "url")]
    UrlFetch,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Code => "code",
            TaskKind::UrlFetch => "url",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a task kind string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task type '{0}' (expected 'code' or 'url')")]
pub struct UnknownTaskKind(pub String);

impl FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" | "php" => Ok(TaskKind::Code),
            "url" => Ok(TaskKind::UrlFetch),
            _ => Err(UnknownTaskKind(s.to_string())),
        }
    }
}

pub const MIN_INTERVAL_SECS: i64 = 1;
pub const MAX_INTERVAL_SECS: i64 = 3_600;
pub const MAX_WINDOW_SECS: i64 = 86_400;

/// A timing or payload rule broken by a set of task settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsViolation {
    #[error("taskCode must not be empty")]
    EmptyPayload,

    #[error("interval must be between 1 and 3600 seconds (got {0})")]
    IntervalOutOfRange(i64),

    #[error("window ({window}s) must be greater than or equal to interval ({interval}s)")]
    WindowBelowInterval { window: i64, interval: i64 },

    #[error("window must not exceed 86400 seconds (got {0})")]
    WindowTooLarge(i64),
}

/// Interval must lie in `1..=3600` seconds.
pub fn check_interval(interval: i64) -> Result<(), SettingsViolation> {
    if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&interval) {
        Ok(())
    } else {
        Err(SettingsViolation::IntervalOutOfRange(interval))
    }
}

/// Window must lie in `interval..=86400` seconds.
pub fn check_window(interval: i64, window: i64) -> Result<(), SettingsViolation> {
    if window < interval {
        return Err(SettingsViolation::WindowBelowInterval { window, interval });
    }
    if window > MAX_WINDOW_SECS {
        return Err(SettingsViolation::WindowTooLarge(window));
    }
    Ok(())
}

/// The mutable part of a task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSettings {
    #[serde(rename = "taskType")]
    pub kind: TaskKind,
    #[serde(rename = "taskCode")]
    pub payload: String,
    #[serde(rename = "interval")]
    pub interval_secs: u64,
    #[serde(rename = "window")]
    pub window_secs: u64,
}

impl TaskSettings {
    pub fn new(kind: TaskKind, payload: impl Into<String>, interval_secs: u64, window_secs: u64) -> Self {
        Self {
            kind,
            payload: payload.into(),
            interval_secs,
            window_secs,
        }
    }

    /// Check the invariants every stored task must hold.
    ///
    /// Records written by older installers may break them, so stores run
    /// this on every load.
    pub fn check(&self) -> Result<(), SettingsViolation> {
        if self.payload.trim().is_empty() {
            return Err(SettingsViolation::EmptyPayload);
        }
        let interval = i64::try_from(self.interval_secs).unwrap_or(i64::MAX);
        let window = i64::try_from(self.window_secs).unwrap_or(i64::MAX);
        check_interval(interval)?;
        check_window(interval, window)
    }
}

/// One installed instance: identity, capability token and settings.
///
/// `suffix` and `secret` never change after installation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub suffix: String,
    pub secret: String,
    #[serde(flatten)]
    pub settings: TaskSettings,
}

impl TaskDefinition {
    pub fn new(suffix: impl Into<String>, secret: impl Into<String>, settings: TaskSettings) -> Self {
        Self {
            suffix: suffix.into(),
            secret: secret.into(),
            settings,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.settings.kind
    }

    pub fn payload(&self) -> &str {
        &self.settings.payload
    }

    pub fn interval_secs(&self) -> u64 {
        self.settings.interval_secs
    }

    pub fn window_secs(&self) -> u64 {
        self.settings.window_secs
    }
}

impl fmt::Debug for TaskDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDefinition")
            .field("suffix", &self.suffix)
            .field("secret", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}
