//! Instance installation.

use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use nocron_protocols::{InstanceStore, StoreError, TaskDefinition, log_line};

use crate::error::InstallError;
use crate::validate::{TaskCandidate, TaskValidator, ValidationError};

/// Length of a generated suffix.
const GENERATED_SUFFIX_LEN: usize = 6;

/// Attempts at finding a free generated suffix.
const MAX_SUFFIX_ATTEMPTS: usize = 5;

/// Secret entropy in bytes (hex-encoded to twice this length).
const SECRET_BYTES: usize = 16;

/// What the caller asks to install.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallRequest {
    /// Preferred suffix. Non-alphanumerics are stripped; too short means random.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(flatten)]
    pub candidate: TaskCandidate,
}

/// Everything the caller needs to drive the new instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReceipt {
    pub suffix: String,
    pub secret: String,
    pub worker_url: String,
    pub manager_url: String,
}

/// Creates instances.
#[derive(Clone)]
pub struct Installer {
    store: Arc<dyn InstanceStore>,
    base_url: String,
}

impl Installer {
    pub fn new(store: Arc<dyn InstanceStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Validate settings, allocate a suffix and secret, persist the records.
    pub async fn install(&self, request: InstallRequest) -> Result<InstallReceipt, InstallError> {
        let settings = TaskValidator::validate(&request.candidate)?;
        let requested = request.suffix.as_deref().map(sanitize_suffix).unwrap_or_default();
        if requested.len() > 20 {
            return Err(ValidationError::SuffixTooLong(requested.len()).into());
        }

        let secret = generate_secret();
        let suffix = if requested.len() >= 3 {
            let task = TaskDefinition::new(&requested, &secret, settings);
            self.create(&task).await?;
            requested
        } else {
            self.create_with_generated_suffix(&secret, settings).await?
        };

        info!(suffix = %suffix, "Instance installed");
        // The instance exists from here on; report it even if the log line is lost.
        if let Err(e) = self
            .store
            .append_log(&suffix, &log_line(Utc::now(), "Installed"))
            .await
        {
            warn!(suffix = %suffix, error = %e, "Run log not written");
        }

        Ok(InstallReceipt {
            worker_url: format!("{}/worker/{}?auth={}", self.base_url, suffix, secret),
            manager_url: format!("{}/manager/{}?auth={}", self.base_url, suffix, secret),
            suffix,
            secret,
        })
    }

    async fn create_with_generated_suffix(
        &self,
        secret: &str,
        settings: nocron_protocols::TaskSettings,
    ) -> Result<String, InstallError> {
        for _ in 0..MAX_SUFFIX_ATTEMPTS {
            let suffix = generate_suffix();
            let task = TaskDefinition::new(&suffix, secret, settings.clone());
            match self.create(&task).await {
                Ok(()) => return Ok(suffix),
                Err(InstallError::SuffixTaken(taken)) => {
                    debug!(suffix = %taken, "Generated suffix collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(InstallError::SuffixExhausted)
    }

    async fn create(&self, task: &TaskDefinition) -> Result<(), InstallError> {
        self.store.create_task(task).await.map_err(|e| match e {
            StoreError::AlreadyExists(suffix) => InstallError::SuffixTaken(suffix),
            other => InstallError::Store(other),
        })
    }
}

/// Keep only ASCII alphanumerics.
pub fn sanitize_suffix(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn generate_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
