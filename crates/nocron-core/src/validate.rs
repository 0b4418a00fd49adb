//! Task settings validation.
//!
//! Checks run in a fixed order and stop at the first violation, so the
//! caller always gets exactly one reason.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nocron_protocols::{SettingsViolation, TaskKind, TaskSettings, check_interval, check_window};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("taskType must be 'code' or 'url' (got '{0}')")]
    UnknownTaskType(String),

    #[error("taskCode must not be empty")]
    EmptyPayload,

    #[error("taskCode must be an absolute http(s) URL: {0}")]
    InvalidUrl(String),

    #[error("{field} must be an integer (got '{value}')")]
    NotAnInteger { field: &'static str, value: String },

    #[error("interval must be between 1 and 3600 seconds (got {0})")]
    IntervalOutOfRange(i64),

    #[error("window ({window}s) must be greater than or equal to interval ({interval}s)")]
    WindowBelowInterval { window: i64, interval: i64 },

    #[error("window must not exceed 86400 seconds (got {0})")]
    WindowTooLarge(i64),

    #[error("suffix must be at most 20 characters (got {0})")]
    SuffixTooLong(usize),
}

impl From<SettingsViolation> for ValidationError {
    fn from(v: SettingsViolation) -> Self {
        match v {
            SettingsViolation::EmptyPayload => ValidationError::EmptyPayload,
            SettingsViolation::IntervalOutOfRange(i) => ValidationError::IntervalOutOfRange(i),
            SettingsViolation::WindowBelowInterval { window, interval } => {
                ValidationError::WindowBelowInterval { window, interval }
            }
            SettingsViolation::WindowTooLarge(w) => ValidationError::WindowTooLarge(w),
        }
    }
}

/// Raw, unvalidated settings as they arrive from a caller.
///
/// Every field is optional text so that type errors surface as validation
/// errors rather than extractor rejections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCandidate {
    #[serde(rename = "taskType", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(rename = "taskCode", default, skip_serializing_if = "Option::is_none")]
    pub task_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

impl TaskCandidate {
    /// A candidate carrying every field of `settings`.
    pub fn from_settings(settings: &TaskSettings) -> Self {
        Self {
            task_type: Some(settings.kind.as_str().to_string()),
            task_code: Some(settings.payload.clone()),
            interval: Some(settings.interval_secs.to_string()),
            window: Some(settings.window_secs.to_string()),
        }
    }

    /// Fill fields the caller left out from `current`.
    pub fn merged_with(self, current: &TaskSettings) -> Self {
        let base = Self::from_settings(current);
        Self {
            task_type: self.task_type.or(base.task_type),
            task_code: self.task_code.or(base.task_code),
            interval: self.interval.or(base.interval),
            window: self.window.or(base.window),
        }
    }

    /// Overlay the fields present in `other`.
    pub fn overlay(self, other: TaskCandidate) -> Self {
        Self {
            task_type: other.task_type.or(self.task_type),
            task_code: other.task_code.or(self.task_code),
            interval: other.interval.or(self.interval),
            window: other.window.or(self.window),
        }
    }
}

/// Validates candidates into [`TaskSettings`].
pub struct TaskValidator;

impl TaskValidator {
    /// Validate a candidate. Pure: touches no storage.
    pub fn validate(candidate: &TaskCandidate) -> Result<TaskSettings, ValidationError> {
        let raw_kind = candidate
            .task_type
            .as_deref()
            .ok_or(ValidationError::MissingField("taskType"))?;
        let kind: TaskKind = raw_kind
            .parse()
            .map_err(|_| ValidationError::UnknownTaskType(raw_kind.to_string()))?;

        let payload = candidate
            .task_code
            .as_deref()
            .ok_or(ValidationError::MissingField("taskCode"))?;
        if payload.trim().is_empty() {
            return Err(ValidationError::EmptyPayload);
        }
        let payload = match kind {
            TaskKind::UrlFetch => Self::validate_url(payload.trim())?,
            TaskKind::Code => payload.to_string(),
        };

        let interval = Self::parse_int("interval", candidate.interval.as_deref())?;
        check_interval(interval)?;

        let window = Self::parse_int("window", candidate.window.as_deref())?;
        check_window(interval, window)?;

        Ok(TaskSettings::new(kind, payload, interval as u64, window as u64))
    }

    fn validate_url(raw: &str) -> Result<String, ValidationError> {
        match url::Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(raw.to_string()),
            Ok(url) => Err(ValidationError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            ))),
            Err(e) => Err(ValidationError::InvalidUrl(e.to_string())),
        }
    }

    fn parse_int(field: &'static str, raw: Option<&str>) -> Result<i64, ValidationError> {
        let raw = raw.ok_or(ValidationError::MissingField(field))?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotAnInteger {
                field,
                value: raw.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
