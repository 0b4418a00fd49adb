//! Error types for the worker loop.

use thiserror::Error;

use nocron_core::AuthError;

/// Errors that keep an invocation from starting.
///
/// Once the loop runs, nothing is an error: faults become failed ticks.
#[derive(Debug, Error)]
pub enum RunLoopError {
    /// Bad token, unknown suffix, or unreadable task record.
    #[error("Unauthorized")]
    Unauthorized,
}

impl From<AuthError> for RunLoopError {
    fn from(_: AuthError) -> Self {
        RunLoopError::Unauthorized
    }
}
