//! Hand-off through the instance's own worker entry point.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use nocron_protocols::{RespawnAck, RespawnError, Respawner};

/// Calls `GET {base}/worker/{suffix}?auth={secret}`.
///
/// The next invocation answers only when its own window closes, so the call
/// gives up after a short timeout. A connection that was accepted but not
/// answered in time counts as handed off.
#[derive(Debug, Clone)]
pub struct HttpRespawner {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRespawner {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!("nocron/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// The worker URL for `suffix`, carrying `secret`.
    pub fn worker_url(&self, suffix: &str, secret: &str) -> Result<Url, RespawnError> {
        let mut url = Url::parse(&format!("{}/worker/{}", self.base_url, suffix))
            .map_err(|e| RespawnError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("auth", secret);
        Ok(url)
    }
}

#[async_trait]
impl Respawner for HttpRespawner {
    async fn respawn(&self, suffix: &str, secret: &str) -> Result<RespawnAck, RespawnError> {
        let url = self.worker_url(suffix, secret)?;
        debug!(suffix, base = %self.base_url, "Requesting next worker invocation");

        match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => Ok(RespawnAck::Accepted),
            Ok(response) => Err(RespawnError::Rejected(response.status().as_u16())),
            Err(e) if e.is_timeout() && !e.is_connect() => Ok(RespawnAck::Running),
            // The request URL carries the secret; keep it out of the message.
            Err(e) => Err(RespawnError::Transport(e.without_url().to_string())),
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
