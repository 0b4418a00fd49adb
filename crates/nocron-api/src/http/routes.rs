//! HTTP route definitions.
//!
//! ```text
//! GET      /worker/{suffix}   - Run one worker invocation
//! GET|POST /manager/{suffix}  - Manager actions
//! POST     /install           - Create an instance
//! GET      /health            - Health check
//! ```

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::http::{install, manager, monitoring, worker};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/worker/{suffix}", get(worker::run_worker))
        .route("/manager/{suffix}", get(manager::manage).post(manager::manage))
        .route("/install", post(install::install))
        .route("/health", get(monitoring::health))
        // Spans carry the path only: the query string holds the instance secret.
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            info_span!("http", method = %request.method(), path = %request.uri().path())
        }))
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
