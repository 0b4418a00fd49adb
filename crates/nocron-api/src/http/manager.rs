//! Manager entry point.
//!
//! GET|POST /manager/{suffix}?auth={secret}&action={action}
//!
//! Settings for `validate` and `update` come from the query string and, on
//! POST, from a JSON or form body. Body fields win.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};

use nocron_core::ManagerAction;

use crate::error::ApiError;
use crate::http::envelope::Envelope;
use crate::http::fields::{BodyFields, EntryQuery};
use crate::state::AppState;

pub async fn manage(
    State(state): State<Arc<AppState>>,
    Path(suffix): Path<String>,
    Query(query): Query<EntryQuery>,
    body: Bytes,
) -> Result<Json<Envelope>, ApiError> {
    let fields = BodyFields::parse(&body)?;

    let action = fields
        .get("action")
        .or(query.action.as_deref())
        .unwrap_or_default();
    // Authenticate before revealing whether the action name is valid.
    let action: ManagerAction = match action.parse() {
        Ok(action) => action,
        Err(e) => {
            state
                .control
                .gate()
                .authorize(&suffix, query.auth.as_deref())
                .await
                .map_err(|_| ApiError::Unauthorized)?;
            return Err(e.into());
        }
    };

    let candidate = query.candidate().overlay(fields.candidate());
    let outcome = state
        .control
        .execute(&suffix, query.auth.as_deref(), action, candidate)
        .await?;

    Ok(Json(
        Envelope::success(outcome.message()).with_data(outcome.data()),
    ))
}
