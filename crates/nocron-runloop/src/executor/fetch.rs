//! URL tasks: one HTTP GET per tick.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use nocron_protocols::{TaskDefinition, TaskExecutor, TaskFault, TaskOutput};

const USER_AGENT: &str = concat!("nocron/", env!("CARGO_PKG_VERSION"));

/// Fetches the task payload URL.
///
/// Non-2xx answers and transport errors are faults. The body is read to the
/// end so the target sees a complete request.
#[derive(Debug, Clone)]
pub struct RemoteFetchExecutor {
    client: Client,
    timeout: Duration,
}

impl RemoteFetchExecutor {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, e: reqwest::Error) -> TaskFault {
        if e.is_timeout() {
            TaskFault::Timeout(self.timeout.as_secs())
        } else {
            TaskFault::Transport(e.to_string())
        }
    }
}

impl Default for RemoteFetchExecutor {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl TaskExecutor for RemoteFetchExecutor {
    async fn execute(&self, task: &TaskDefinition) -> Result<TaskOutput, TaskFault> {
        let url = url::Url::parse(task.payload().trim())
            .map_err(|e| TaskFault::InvalidPayload(format!("Invalid URL: {}", e)))?;

        debug!(suffix = %task.suffix, %url, "Fetching task URL");
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskFault::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_error(e))?;
        Ok(TaskOutput::new(format!(
            "HTTP {} ({} bytes)",
            status.as_u16(),
            body.len()
        )))
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
