//! Respawn (self re-trigger) errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RespawnError {
    #[error("Respawn target rejected the hand-off with HTTP {0}")]
    Rejected(u16),

    #[error("Respawn transport error: {0}")]
    Transport(String),

    #[error("Invalid respawn URL: {0}")]
    InvalidUrl(String),

    #[error("Local relay is not running")]
    RelayClosed,
}
