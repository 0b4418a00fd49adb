//! Task executor protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TaskFault;
use crate::types::TaskDefinition;

/// Short description of a successful execution, used in the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub summary: String,
}

impl TaskOutput {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }
}

/// Runs one tick of a task.
///
/// Implementations must bound their own run time; the scheduler does not
/// preempt an execution in flight.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &TaskDefinition) -> Result<TaskOutput, TaskFault>;
}
