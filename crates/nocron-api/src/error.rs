//! HTTP error mapping.
//!
//! Authentication failures answer a bare `403 Forbidden` whatever the cause.
//! Storage and runtime failures are logged in full and answered with a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use nocron_core::{ControlError, InstallError};
use nocron_runloop::RunLoopError;

use crate::http::envelope::Envelope;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Forbidden")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Suffix already in use: {0}")]
    Conflict(String),

    #[error("Installation is disabled")]
    InstallDisabled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => return (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            ApiError::Validation(m) | ApiError::BadRequest(m) => {
                (StatusCode::BAD_REQUEST, m.clone())
            }
            ApiError::UnknownAction(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::InstallDisabled => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(m) => {
                error!(message = %m, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(Envelope::error(message))).into_response()
    }
}

impl From<ControlError> for ApiError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::Unauthorized => ApiError::Unauthorized,
            ControlError::Validation(v) => ApiError::Validation(v.to_string()),
            ControlError::UnknownAction(a) => ApiError::UnknownAction(a),
            ControlError::Store(s) => ApiError::Internal(s.to_string()),
        }
    }
}

impl From<InstallError> for ApiError {
    fn from(e: InstallError) -> Self {
        match e {
            InstallError::Validation(v) => ApiError::Validation(v.to_string()),
            InstallError::SuffixTaken(s) => ApiError::Conflict(s),
            InstallError::SuffixExhausted => {
                ApiError::Internal("could not allocate a free suffix".to_string())
            }
            InstallError::Store(s) => ApiError::Internal(s.to_string()),
        }
    }
}

impl From<RunLoopError> for ApiError {
    fn from(e: RunLoopError) -> Self {
        match e {
            RunLoopError::Unauthorized => ApiError::Unauthorized,
        }
    }
}
