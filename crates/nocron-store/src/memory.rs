//! In-memory instance store.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use nocron_protocols::{
    InstanceStore, PauseSignalStore, SettingsEdit, StatsSnapshot, StatsStore, StoreError,
    TaskDefinition, TaskStore, TickRecord,
};

#[derive(Debug)]
struct MemoryInstance {
    task: TaskDefinition,
    stats: StatsSnapshot,
    logs: VecDeque<String>,
    pause: PauseState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PauseState {
    #[default]
    Running,
    Requested,
    Halted,
}

/// In-memory instance store for testing.
///
/// The write half of the map lock plays the role of the record lock.
pub struct MemoryInstanceStore {
    instances: RwLock<HashMap<String, MemoryInstance>>,
    log_retention: usize,
}

impl MemoryInstanceStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            log_retention: 500,
        }
    }

    /// Set how many run-log lines are kept per instance.
    pub fn with_log_retention(mut self, lines: usize) -> Self {
        self.log_retention = lines.max(1);
        self
    }
}

impl Default for MemoryInstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MemoryInstanceStore {
    async fn create_task(&self, task: &TaskDefinition) -> Result<(), StoreError> {
        let mut instances = self.instances.write().await;
        if instances.contains_key(&task.suffix) {
            return Err(StoreError::AlreadyExists(task.suffix.clone()));
        }
        instances.insert(
            task.suffix.clone(),
            MemoryInstance {
                task: task.clone(),
                stats: StatsSnapshot::default(),
                logs: VecDeque::new(),
                pause: PauseState::Running,
            },
        );
        Ok(())
    }

    async fn load_task(&self, suffix: &str) -> Result<Option<TaskDefinition>, StoreError> {
        let instances = self.instances.read().await;
        let Some(instance) = instances.get(suffix) else {
            return Ok(None);
        };
        instance
            .task
            .settings
            .check()
            .map_err(|e| StoreError::Corrupt {
                suffix: suffix.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(instance.task.clone()))
    }

    async fn update_task(
        &self,
        suffix: &str,
        edit: SettingsEdit,
    ) -> Result<TaskDefinition, StoreError> {
        let mut instances = self.instances.write().await;
        let instance = instances
            .get_mut(suffix)
            .ok_or_else(|| StoreError::NotFound(suffix.to_string()))?;
        instance.task.settings = edit(&instance.task.settings).map_err(StoreError::Rejected)?;
        Ok(instance.task.clone())
    }

    async fn list_suffixes(&self) -> Result<Vec<String>, StoreError> {
        let instances = self.instances.read().await;
        let mut suffixes: Vec<String> = instances.keys().cloned().collect();
        suffixes.sort();
        Ok(suffixes)
    }
}

#[async_trait]
impl StatsStore for MemoryInstanceStore {
    async fn load_stats(&self, suffix: &str) -> Result<StatsSnapshot, StoreError> {
        let instances = self.instances.read().await;
        Ok(instances
            .get(suffix)
            .map(|i| i.stats.clone())
            .unwrap_or_default())
    }

    async fn record_tick(
        &self,
        suffix: &str,
        tick: &TickRecord,
    ) -> Result<StatsSnapshot, StoreError> {
        let mut instances = self.instances.write().await;
        let instance = instances
            .get_mut(suffix)
            .ok_or_else(|| StoreError::NotFound(suffix.to_string()))?;
        instance.stats.apply(tick);
        Ok(instance.stats.clone())
    }

    async fn append_log(&self, suffix: &str, line: &str) -> Result<(), StoreError> {
        let mut instances = self.instances.write().await;
        let instance = instances
            .get_mut(suffix)
            .ok_or_else(|| StoreError::NotFound(suffix.to_string()))?;
        instance.logs.push_back(line.replace('\n', " "));
        while instance.logs.len() > self.log_retention {
            instance.logs.pop_front();
        }
        Ok(())
    }

    async fn recent_logs(&self, suffix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let instances = self.instances.read().await;
        Ok(instances
            .get(suffix)
            .map(|i| i.logs.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PauseSignalStore for MemoryInstanceStore {
    async fn raise_pause(&self, suffix: &str) -> Result<(), StoreError> {
        let mut instances = self.instances.write().await;
        let instance = instances
            .get_mut(suffix)
            .ok_or_else(|| StoreError::NotFound(suffix.to_string()))?;
        instance.pause = PauseState::Requested;
        Ok(())
    }

    async fn clear_pause(&self, suffix: &str) -> Result<(), StoreError> {
        let mut instances = self.instances.write().await;
        if let Some(instance) = instances.get_mut(suffix) {
            instance.pause = PauseState::Running;
        }
        Ok(())
    }

    async fn is_paused(&self, suffix: &str) -> Result<bool, StoreError> {
        let instances = self.instances.read().await;
        Ok(instances
            .get(suffix)
            .is_some_and(|i| i.pause != PauseState::Running))
    }

    async fn consume_pause(&self, suffix: &str) -> Result<bool, StoreError> {
        let mut instances = self.instances.write().await;
        let Some(instance) = instances.get_mut(suffix) else {
            return Ok(false);
        };
        let requested = instance.pause == PauseState::Requested;
        instance.pause = if requested {
            PauseState::Halted
        } else {
            PauseState::Running
        };
        Ok(requested)
    }
}

#[async_trait]
impl InstanceStore for MemoryInstanceStore {
    async fn destroy(&self, suffix: &str) -> Result<(), StoreError> {
        let mut instances = self.instances.write().await;
        instances.remove(suffix);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nocron_protocols::{TaskKind, TaskSettings, TickOutcome};

    fn definition(suffix: &str) -> TaskDefinition {
        TaskDefinition::new(
            suffix,
            "secret",
            TaskSettings::new(TaskKind::UrlFetch, "https://example.com", 5, 20),
        )
    }

    #[tokio::test]
    async fn test_memory_instance_store() {
        let store = MemoryInstanceStore::new();
        store.create_task(&definition("abc")).await.unwrap();
        assert!(store.create_task(&definition("abc")).await.is_err());

        let loaded = store.load_task("abc").await.unwrap();
        assert_eq!(loaded.unwrap().suffix, "abc");

        let tick = TickRecord::new(Utc::now(), 5, TickOutcome::Success { detail: "ok".into() });
        let stats = store.record_tick("abc", &tick).await.unwrap();
        assert_eq!(stats.total_success, 1);

        store.destroy("abc").await.unwrap();
        assert!(store.load_task("abc").await.unwrap().is_none());
        assert!(store.record_tick("abc", &tick).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_log_retention() {
        let store = MemoryInstanceStore::new().with_log_retention(2);
        store.create_task(&definition("abc")).await.unwrap();
        for line in ["a", "b", "c"] {
            store.append_log("abc", line).await.unwrap();
        }
        assert_eq!(store.recent_logs("abc", 10).await.unwrap(), vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_memory_load_rejects_broken_settings() {
        let store = MemoryInstanceStore::new();
        let mut task = definition("abc");
        task.settings.interval_secs = 0;
        store.create_task(&task).await.unwrap();

        let err = store.load_task("abc").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_memory_rejected_edit_leaves_record() {
        let store = MemoryInstanceStore::new();
        store.create_task(&definition("abc")).await.unwrap();

        let err = store
            .update_task("abc", Box::new(|_: &TaskSettings| Err("no".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(store.load_task("abc").await.unwrap().unwrap(), definition("abc"));
    }

    #[tokio::test]
    async fn test_memory_pause_consume() {
        let store = MemoryInstanceStore::new();
        store.create_task(&definition("abc")).await.unwrap();
        store.raise_pause("abc").await.unwrap();
        assert!(store.consume_pause("abc").await.unwrap());
        assert!(store.is_paused("abc").await.unwrap());
        assert!(!store.consume_pause("abc").await.unwrap());
        assert!(!store.is_paused("abc").await.unwrap());
    }
}
