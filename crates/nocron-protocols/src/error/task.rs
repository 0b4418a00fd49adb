//! Task execution faults.
//!
//! A fault is data, not control flow: the scheduler records it as a failed
//! tick and keeps going.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskFault {
    #[error("Task timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Code exited with status {code}: {output}")]
    NonZeroExit { code: i32, output: String },

    #[error("Failed to start code: {0}")]
    Spawn(String),

    #[error("Code execution disabled")]
    CodeDisabled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = TaskFault::HttpStatus {
            status: 503,
            url: "https://example.com/ping".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("503"));
        assert!(display.contains("example.com/ping"));
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(TaskFault::Timeout(10).to_string(), "Task timed out after 10s");
    }

    #[test]
    fn test_code_disabled_display() {
        assert!(TaskFault::CodeDisabled.to_string().contains("disabled"));
    }
}
