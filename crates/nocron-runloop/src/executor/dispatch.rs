//! Routes a task to the executor for its kind.

use std::sync::Arc;

use async_trait::async_trait;

use nocron_protocols::{TaskDefinition, TaskExecutor, TaskFault, TaskKind, TaskOutput};

pub struct DispatchExecutor {
    fetch: Arc<dyn TaskExecutor>,
    code: Arc<dyn TaskExecutor>,
}

impl DispatchExecutor {
    pub fn new(fetch: Arc<dyn TaskExecutor>, code: Arc<dyn TaskExecutor>) -> Self {
        Self { fetch, code }
    }
}

#[async_trait]
impl TaskExecutor for DispatchExecutor {
    async fn execute(&self, task: &TaskDefinition) -> Result<TaskOutput, TaskFault> {
        match task.kind() {
            TaskKind::UrlFetch => self.fetch.execute(task).await,
            TaskKind::Code => self.code.execute(task).await,
        }
    }
}
