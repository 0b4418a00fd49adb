//! Core error types.

use thiserror::Error;

use nocron_protocols::StoreError;

use crate::validate::ValidationError;

/// Token mismatch, unknown suffix, or unreadable record. Deliberately carries
/// no detail about which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
}

/// Control plane errors.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<AuthError> for ControlError {
    fn from(_: AuthError) -> Self {
        ControlError::Unauthorized
    }
}

/// Installation errors.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Suffix already in use: {0}")]
    SuffixTaken(String),

    #[error("Could not allocate a free suffix")]
    SuffixExhausted,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
