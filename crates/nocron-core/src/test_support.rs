//! Store wrappers for tests.

use async_trait::async_trait;

use nocron_protocols::{
    InstanceStore, PauseSignalStore, SettingsEdit, StatsSnapshot, StatsStore, StoreError,
    TaskDefinition, TaskStore, TickRecord,
};
use nocron_store::MemoryInstanceStore;

/// A memory store whose run log cannot be written.
#[derive(Default)]
pub(crate) struct UnloggedStore {
    pub(crate) inner: MemoryInstanceStore,
}

#[async_trait]
impl TaskStore for UnloggedStore {
    async fn create_task(&self, task: &TaskDefinition) -> Result<(), StoreError> {
        self.inner.create_task(task).await
    }

    async fn load_task(&self, suffix: &str) -> Result<Option<TaskDefinition>, StoreError> {
        self.inner.load_task(suffix).await
    }

    async fn update_task(
        &self,
        suffix: &str,
        edit: SettingsEdit,
    ) -> Result<TaskDefinition, StoreError> {
        self.inner.update_task(suffix, edit).await
    }

    async fn list_suffixes(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_suffixes().await
    }
}

#[async_trait]
impl StatsStore for UnloggedStore {
    async fn load_stats(&self, suffix: &str) -> Result<StatsSnapshot, StoreError> {
        self.inner.load_stats(suffix).await
    }

    async fn record_tick(
        &self,
        suffix: &str,
        tick: &TickRecord,
    ) -> Result<StatsSnapshot, StoreError> {
        self.inner.record_tick(suffix, tick).await
    }

    async fn append_log(&self, suffix: &str, _line: &str) -> Result<(), StoreError> {
        Err(StoreError::Lock(format!("{}/runs.lock", suffix)))
    }

    async fn recent_logs(&self, suffix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        self.inner.recent_logs(suffix, limit).await
    }
}

#[async_trait]
impl PauseSignalStore for UnloggedStore {
    async fn raise_pause(&self, suffix: &str) -> Result<(), StoreError> {
        self.inner.raise_pause(suffix).await
    }

    async fn clear_pause(&self, suffix: &str) -> Result<(), StoreError> {
        self.inner.clear_pause(suffix).await
    }

    async fn is_paused(&self, suffix: &str) -> Result<bool, StoreError> {
        self.inner.is_paused(suffix).await
    }

    async fn consume_pause(&self, suffix: &str) -> Result<bool, StoreError> {
        self.inner.consume_pause(suffix).await
    }
}

#[async_trait]
impl InstanceStore for UnloggedStore {
    async fn destroy(&self, suffix: &str) -> Result<(), StoreError> {
        self.inner.destroy(suffix).await
    }
}
