//! Task executors.

mod code;
mod dispatch;
mod fetch;

pub use code::{CodeSandbox, SandboxedCodeExecutor};
pub use dispatch::DispatchExecutor;
pub use fetch::RemoteFetchExecutor;

/// Longest output excerpt kept in a run-log line.
const MAX_EXCERPT_CHARS: usize = 200;

/// First non-empty line of `text`, shortened for the run log.
pub(crate) fn excerpt(text: &str) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    if line.chars().count() > MAX_EXCERPT_CHARS {
        let cut: String = line.chars().take(MAX_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
