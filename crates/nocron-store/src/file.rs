//! File system instance store.
//!
//! Layout, one directory per instance:
//!
//! ```text
//! {root}/{suffix}/task.json     TaskDefinition
//! {root}/{suffix}/stats.json    StatsSnapshot
//! {root}/{suffix}/runs.log      run log, one line per event
//! {root}/{suffix}/pause.signal  present while a pause is requested
//! {root}/{suffix}/halted.signal present once a worker stopped on a pause
//! {root}/{suffix}/*.lock        record locks
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use nocron_protocols::{
    InstanceStore, PauseSignalStore, SettingsEdit, StatsSnapshot, StatsStore, StoreError,
    TaskDefinition, TaskStore, TickRecord,
};

use crate::is_valid_suffix;
use crate::lock::{with_exclusive_lock, write_atomic};

/// File system based instance store.
#[derive(Debug, Clone)]
pub struct FileInstanceStore {
    root: PathBuf,
    log_retention: usize,
}

/// Paths of one instance's records.
#[derive(Debug, Clone)]
struct InstancePaths {
    suffix: String,
    dir: PathBuf,
}

impl InstancePaths {
    fn task(&self) -> PathBuf {
        self.dir.join("task.json")
    }

    fn task_lock(&self) -> PathBuf {
        self.dir.join("task.lock")
    }

    fn stats(&self) -> PathBuf {
        self.dir.join("stats.json")
    }

    fn stats_lock(&self) -> PathBuf {
        self.dir.join("stats.lock")
    }

    fn log(&self) -> PathBuf {
        self.dir.join("runs.log")
    }

    fn log_lock(&self) -> PathBuf {
        self.dir.join("runs.lock")
    }

    fn pause(&self) -> PathBuf {
        self.dir.join("pause.signal")
    }

    fn halted(&self) -> PathBuf {
        self.dir.join("halted.signal")
    }

    /// A killed instance's directory is gone; never recreate it implicitly.
    fn ensure_exists(&self) -> Result<(), StoreError> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(StoreError::NotFound(self.suffix.clone()))
        }
    }
}

impl FileInstanceStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!("FileInstanceStore initialized at {:?}", root);
        Ok(Self {
            root,
            log_retention: 500,
        })
    }

    /// Set how many run-log lines are kept per instance.
    pub fn with_log_retention(mut self, lines: usize) -> Self {
        self.log_retention = lines.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, suffix: &str) -> Result<InstancePaths, StoreError> {
        if !is_valid_suffix(suffix) {
            return Err(StoreError::NotFound(suffix.to_string()));
        }
        Ok(InstancePaths {
            suffix: suffix.to_string(),
            dir: self.root.join(suffix),
        })
    }
}

async fn blocking<T, F>(f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Io(io::Error::other(e)))?
}

fn read_task(paths: &InstancePaths) -> Result<Option<TaskDefinition>, StoreError> {
    let content = match fs::read_to_string(paths.task()) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let task: TaskDefinition =
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            suffix: paths.suffix.clone(),
            reason: e.to_string(),
        })?;
    task.settings.check().map_err(|e| StoreError::Corrupt {
        suffix: paths.suffix.clone(),
        reason: e.to_string(),
    })?;
    Ok(Some(task))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let content =
        serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    write_atomic(path, &content)
}

/// Unreadable or unparsable stats degrade to zeroed counters.
fn read_stats(paths: &InstancePaths) -> StatsSnapshot {
    match fs::read_to_string(paths.stats()) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Stats for '{}' unparsable, using defaults: {}", paths.suffix, e);
            StatsSnapshot::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => StatsSnapshot::default(),
        Err(e) => {
            warn!("Stats for '{}' unreadable, using defaults: {}", paths.suffix, e);
            StatsSnapshot::default()
        }
    }
}

fn remove_if_present(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl TaskStore for FileInstanceStore {
    async fn create_task(&self, task: &TaskDefinition) -> Result<(), StoreError> {
        let paths = self.paths(&task.suffix)?;
        let root = self.root.clone();
        let task = task.clone();

        blocking(move || {
            fs::create_dir_all(&root)?;
            // create_dir is the collision check: it fails if the suffix is taken.
            match fs::create_dir(&paths.dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    return Err(StoreError::AlreadyExists(paths.suffix.clone()));
                }
                Err(e) => return Err(e.into()),
            }
            with_exclusive_lock(&paths.stats_lock(), || {
                write_json(&paths.stats(), &StatsSnapshot::default())
            })?;
            with_exclusive_lock(&paths.task_lock(), || write_json(&paths.task(), &task))?;
            info!("Created instance '{}' at {:?}", paths.suffix, paths.dir);
            Ok(())
        })
        .await
    }

    async fn load_task(&self, suffix: &str) -> Result<Option<TaskDefinition>, StoreError> {
        let paths = match self.paths(suffix) {
            Ok(paths) => paths,
            Err(_) => return Ok(None),
        };
        blocking(move || read_task(&paths)).await
    }

    async fn update_task(
        &self,
        suffix: &str,
        edit: SettingsEdit,
    ) -> Result<TaskDefinition, StoreError> {
        let paths = self.paths(suffix)?;

        blocking(move || {
            paths.ensure_exists()?;
            with_exclusive_lock(&paths.task_lock(), || {
                let mut task =
                    read_task(&paths)?.ok_or_else(|| StoreError::NotFound(paths.suffix.clone()))?;
                task.settings = edit(&task.settings).map_err(StoreError::Rejected)?;
                write_json(&paths.task(), &task)?;
                debug!("Updated task settings for '{}'", paths.suffix);
                Ok(task)
            })
        })
        .await
    }

    async fn list_suffixes(&self) -> Result<Vec<String>, StoreError> {
        let root = self.root.clone();
        blocking(move || {
            let mut suffixes = Vec::new();
            let entries = match fs::read_dir(&root) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(suffixes),
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                let path = entry?.path();
                if !path.join("task.json").is_file() {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if is_valid_suffix(name) {
                        suffixes.push(name.to_string());
                    }
                }
            }
            suffixes.sort();
            Ok(suffixes)
        })
        .await
    }
}

#[async_trait]
impl StatsStore for FileInstanceStore {
    async fn load_stats(&self, suffix: &str) -> Result<StatsSnapshot, StoreError> {
        let paths = self.paths(suffix)?;
        blocking(move || Ok(read_stats(&paths))).await
    }

    async fn record_tick(
        &self,
        suffix: &str,
        tick: &TickRecord,
    ) -> Result<StatsSnapshot, StoreError> {
        let paths = self.paths(suffix)?;
        let tick = tick.clone();
        blocking(move || {
            paths.ensure_exists()?;
            with_exclusive_lock(&paths.stats_lock(), || {
                let mut stats = read_stats(&paths);
                stats.apply(&tick);
                write_json(&paths.stats(), &stats)?;
                Ok(stats)
            })
        })
        .await
    }

    async fn append_log(&self, suffix: &str, line: &str) -> Result<(), StoreError> {
        let paths = self.paths(suffix)?;
        let line = line.replace('\n', " ");
        let retention = self.log_retention;

        blocking(move || {
            paths.ensure_exists()?;
            with_exclusive_lock(&paths.log_lock(), || {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(paths.log())?;
                writeln!(file, "{}", line)?;
                drop(file);

                let content = fs::read_to_string(paths.log())?;
                let lines: Vec<&str> = content.lines().collect();
                if lines.len() > retention {
                    let mut kept = lines[lines.len() - retention..].join("\n");
                    kept.push('\n');
                    write_atomic(&paths.log(), kept.as_bytes())?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn recent_logs(&self, suffix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let paths = self.paths(suffix)?;
        blocking(move || {
            let content = match fs::read_to_string(paths.log()) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            };
            Ok(content
                .lines()
                .rev()
                .filter(|line| !line.is_empty())
                .take(limit)
                .map(str::to_string)
                .collect())
        })
        .await
    }
}

#[async_trait]
impl PauseSignalStore for FileInstanceStore {
    async fn raise_pause(&self, suffix: &str) -> Result<(), StoreError> {
        let paths = self.paths(suffix)?;
        blocking(move || {
            paths.ensure_exists()?;
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(paths.pause())?;
            Ok(())
        })
        .await
    }

    async fn clear_pause(&self, suffix: &str) -> Result<(), StoreError> {
        let paths = self.paths(suffix)?;
        blocking(move || {
            let requested = remove_if_present(&paths.pause())?;
            let halted = remove_if_present(&paths.halted())?;
            Ok(requested || halted)
        })
        .await
        .map(|_| ())
    }

    async fn is_paused(&self, suffix: &str) -> Result<bool, StoreError> {
        let paths = self.paths(suffix)?;
        blocking(move || Ok(paths.pause().exists() || paths.halted().exists())).await
    }

    async fn consume_pause(&self, suffix: &str) -> Result<bool, StoreError> {
        let paths = self.paths(suffix)?;
        // The rename is atomic: only one of several racing consumers wins it.
        blocking(move || match fs::rename(paths.pause(), paths.halted()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                remove_if_present(&paths.halted())?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        })
        .await
    }
}

#[async_trait]
impl InstanceStore for FileInstanceStore {
    async fn destroy(&self, suffix: &str) -> Result<(), StoreError> {
        let paths = self.paths(suffix)?;
        blocking(move || {
            remove_if_present(&paths.task())?;
            match fs::remove_dir_all(&paths.dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            info!("Destroyed instance '{}'", paths.suffix);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
