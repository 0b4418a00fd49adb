//! Installation entry point.
//!
//! POST /install
//!
//! When an install token is configured the caller presents it as
//! `Authorization: Bearer {token}` or `?token={token}`.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};

use nocron_core::InstallRequest;
use nocron_core::auth::tokens_match;

use crate::error::ApiError;
use crate::http::envelope::Envelope;
use crate::http::fields::{BodyFields, EntryQuery};
use crate::state::AppState;

pub async fn install(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntryQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let installer = state.installer.as_ref().ok_or(ApiError::InstallDisabled)?;

    if let Some(expected) = &state.install_token {
        let presented = bearer_token(&headers).or(query.token.as_deref());
        if !presented.is_some_and(|token| tokens_match(expected, token)) {
            return Err(ApiError::Unauthorized);
        }
    }

    let fields = BodyFields::parse(&body)?;
    let request = InstallRequest {
        suffix: fields
            .get("suffix")
            .map(str::to_string)
            .or_else(|| query.suffix.clone()),
        candidate: query.candidate().overlay(fields.candidate()),
    };

    let receipt = installer.install(request).await?;
    let data = serde_json::to_value(&receipt).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(format!("Installed {}", receipt.suffix)).with_data(Some(data))),
    ))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
