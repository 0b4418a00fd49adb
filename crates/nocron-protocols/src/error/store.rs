//! Storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Instance not found: {0}")]
    NotFound(String),

    #[error("Instance already exists: {0}")]
    AlreadyExists(String),

    #[error("Corrupt record for {suffix}: {reason}")]
    Corrupt { suffix: String, reason: String },

    #[error("Update rejected: {0}")]
    Rejected(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to acquire lock on {0}")]
    Lock(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
