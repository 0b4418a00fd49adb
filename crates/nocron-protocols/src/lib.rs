//! # nocron Protocols
//!
//! Shared data model and capability traits for nocron.
//! Contains only definitions - storage, execution and HTTP live in other crates.
//!
//! ## Core Traits
//!
//! - [`TaskStore`] - Durable, lockable record of one [`TaskDefinition`] per instance
//! - [`StatsStore`] - Run counters and the per-instance run log
//! - [`PauseSignalStore`] - The transient "pause requested" marker
//! - [`InstanceStore`] - All of the above plus teardown
//! - [`TaskExecutor`] - Runs one tick of a task payload
//! - [`Respawner`] - Re-arms an instance once its window closes

pub mod error;
pub mod executor;
pub mod respawn;
pub mod store;
pub mod types;

pub use error::{RespawnError, StoreError, TaskFault};
pub use executor::{TaskExecutor, TaskOutput};
pub use respawn::{RespawnAck, Respawner};
pub use store::{
    EditError, InstanceStore, PauseSignalStore, SettingsEdit, StatsStore, TaskStore,
};
pub use types::*;
