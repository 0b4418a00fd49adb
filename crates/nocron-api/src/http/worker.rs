//! Worker entry point.
//!
//! GET /worker/{suffix}?auth={secret}

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::json;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::http::envelope::Envelope;
use crate::http::fields::EntryQuery;
use crate::state::AppState;

/// Run one worker invocation and answer once it ends.
///
/// The loop runs on its own task so a caller that hangs up, such as the
/// previous invocation handing off, does not cancel it.
pub async fn run_worker(
    State(state): State<Arc<AppState>>,
    Path(suffix): Path<String>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<Envelope>, ApiError> {
    let scheduler = state.scheduler.clone();
    let task_suffix = suffix.clone();
    let handle = tokio::spawn(async move {
        scheduler
            .invoke(&task_suffix, query.auth.as_deref())
            .await
    });

    let outcome = match handle.await {
        Ok(result) => result?,
        Err(e) => {
            error!(suffix = %suffix, error = %e, "Worker task aborted");
            return Err(ApiError::Internal(e.to_string()));
        }
    };

    debug!(suffix = %suffix, outcome = outcome.label(), ticks = outcome.ticks(), "Worker finished");
    Ok(Json(
        Envelope::success(format!("Worker finished: {}", outcome.label())).with_data(Some(
            json!({
                "ticks": outcome.ticks(),
                "outcome": outcome.label(),
                "respawned": outcome.respawned(),
            }),
        )),
    ))
}
