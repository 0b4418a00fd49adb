//! Code tasks, run in a child process.
//!
//! The payload never runs inside the server process. Each tick spawns the
//! configured interpreter with the payload as its last argument, an empty
//! environment and a dedicated working directory, and kills it on timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use nocron_protocols::{TaskDefinition, TaskExecutor, TaskFault, TaskOutput};

use super::excerpt;

/// The only variable passed through to the child.
const SANDBOX_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Process sandbox settings.
#[derive(Debug, Clone)]
pub struct CodeSandbox {
    pub enabled: bool,
    /// Program and leading arguments; the payload is appended.
    pub interpreter: Vec<String>,
    pub timeout: Duration,
    pub work_dir: PathBuf,
}

impl CodeSandbox {
    /// A sandbox that refuses every payload.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            interpreter: Vec::new(),
            timeout: Duration::from_secs(30),
            work_dir: std::env::temp_dir(),
        }
    }
}

/// Runs code payloads through [`CodeSandbox`].
#[derive(Debug, Clone)]
pub struct SandboxedCodeExecutor {
    sandbox: CodeSandbox,
}

impl SandboxedCodeExecutor {
    pub fn new(sandbox: CodeSandbox) -> Self {
        Self { sandbox }
    }

    pub fn is_enabled(&self) -> bool {
        self.sandbox.enabled
    }
}

#[async_trait]
impl TaskExecutor for SandboxedCodeExecutor {
    async fn execute(&self, task: &TaskDefinition) -> Result<TaskOutput, TaskFault> {
        if !self.sandbox.enabled {
            return Err(TaskFault::CodeDisabled);
        }
        let (program, args) = self
            .sandbox
            .interpreter
            .split_first()
            .ok_or_else(|| TaskFault::Spawn("no interpreter configured".to_string()))?;

        tokio::fs::create_dir_all(&self.sandbox.work_dir)
            .await
            .map_err(|e| TaskFault::Spawn(format!("work dir: {}", e)))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(task.payload())
            .env_clear()
            .env("PATH", SANDBOX_PATH)
            .current_dir(&self.sandbox.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(suffix = %task.suffix, program = %program, "Running code task");
        let output = timeout(self.sandbox.timeout, cmd.output())
            .await
            .map_err(|_| {
                warn!(suffix = %task.suffix, "Code task timed out, child killed");
                TaskFault::Timeout(self.sandbox.timeout.as_secs())
            })?
            .map_err(|e| TaskFault::Spawn(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            let first = excerpt(&stdout);
            if first.is_empty() {
                Ok(TaskOutput::new("exit 0"))
            } else {
                Ok(TaskOutput::new(format!("exit 0: {}", first)))
            }
        } else {
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            Err(TaskFault::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                output: excerpt(&detail),
            })
        }
    }
}

#[cfg(test)]
#[path = "code_tests.rs"]
mod tests;
