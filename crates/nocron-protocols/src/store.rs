//! Storage protocol definitions.
//!
//! Every write is a full-record overwrite made while holding an exclusive
//! lock on that record, released on every exit path. Reads take no lock and
//! must tolerate a concurrent writer.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{StatsSnapshot, TaskDefinition, TaskSettings, TickRecord};

/// Why a [`SettingsEdit`] refused to produce new settings.
pub type EditError = Box<dyn std::error::Error + Send + Sync>;

/// Computes new settings from the stored ones.
pub type SettingsEdit = Box<dyn FnOnce(&TaskSettings) -> Result<TaskSettings, EditError> + Send>;

/// Durable record of one task definition per instance.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new definition. Fails with `AlreadyExists` on suffix collision.
    async fn create_task(&self, task: &TaskDefinition) -> Result<(), StoreError>;

    /// Load a definition. Unparsable content, or settings that break
    /// [`TaskSettings::check`], are `Corrupt`, never a default.
    async fn load_task(&self, suffix: &str) -> Result<Option<TaskDefinition>, StoreError>;

    /// Replace the mutable settings with `edit(current)`, holding the task
    /// lock across the read and the write.
    ///
    /// An `Err` from `edit` leaves the record untouched and comes back as
    /// [`StoreError::Rejected`].
    async fn update_task(&self, suffix: &str, edit: SettingsEdit)
        -> Result<TaskDefinition, StoreError>;

    /// All installed suffixes.
    async fn list_suffixes(&self) -> Result<Vec<String>, StoreError>;
}

/// Run counters and the per-instance run log.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Load the snapshot, falling back to defaults when missing or unparsable.
    async fn load_stats(&self, suffix: &str) -> Result<StatsSnapshot, StoreError>;

    /// Read-modify-write one tick into the snapshot under the stats lock.
    async fn record_tick(&self, suffix: &str, tick: &TickRecord)
        -> Result<StatsSnapshot, StoreError>;

    /// Append a line to the run log.
    async fn append_log(&self, suffix: &str, line: &str) -> Result<(), StoreError>;

    /// The newest `limit` run-log lines, most recent first.
    async fn recent_logs(&self, suffix: &str, limit: usize) -> Result<Vec<String>, StoreError>;
}

/// The pause marker.
///
/// A pause moves through two states: *requested* by the manager, then
/// *halted* once a worker honours it. Both read as paused.
#[async_trait]
pub trait PauseSignalStore: Send + Sync {
    /// Request a pause. Idempotent.
    async fn raise_pause(&self, suffix: &str) -> Result<(), StoreError>;

    /// Drop any pause state. Idempotent.
    async fn clear_pause(&self, suffix: &str) -> Result<(), StoreError>;

    /// Whether a pause is requested or in effect.
    async fn is_paused(&self, suffix: &str) -> Result<bool, StoreError>;

    /// Called by the worker before each tick.
    ///
    /// Turns a pending request into the halted state and returns `true`.
    /// Without a request it clears any stale halted state, since a running
    /// worker means the instance is no longer halted, and returns `false`.
    /// Of several racing callers only one sees `true`.
    async fn consume_pause(&self, suffix: &str) -> Result<bool, StoreError>;
}

/// Everything an instance owns, plus teardown.
#[async_trait]
pub trait InstanceStore: TaskStore + StatsStore + PauseSignalStore {
    /// Irreversibly delete every record of an instance.
    ///
    /// The task definition goes first, so a teardown interrupted halfway
    /// already reads as "not found".
    async fn destroy(&self, suffix: &str) -> Result<(), StoreError>;
}
