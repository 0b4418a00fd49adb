//! HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::routes::create_router;
use crate::state::AppState;

/// Listen address.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

pub struct ApiServer {
    settings: ServerSettings,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(settings: ServerSettings, state: Arc<AppState>) -> Self {
        Self { settings, state }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.settings.host, self.settings.port)
    }

    /// Serve until `shutdown` resolves. In-flight worker invocations are
    /// awaited before returning.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("nocron listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("nocron server stopped");
        Ok(())
    }
}
