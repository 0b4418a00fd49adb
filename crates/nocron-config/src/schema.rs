//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub code: CodeConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally reachable base URL. Respawn calls and printed links use
    /// this; falls back to `http://{host}:{port}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl ServerConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Instance storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("~/.nocron/instances")
}

/// How an invocation re-arms itself when its window closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RespawnMode {
    /// Outbound GET to the instance's own worker entry.
    #[default]
    Http,
    /// Hand off to an in-process relay (long-lived process).
    Local,
}

/// Worker loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_respawn_timeout")]
    pub respawn_timeout_secs: u64,

    #[serde(default)]
    pub respawn: RespawnMode,

    /// Run-log lines kept per instance.
    #[serde(default = "default_log_retention")]
    pub log_retention: usize,

    /// Run-log lines returned by the stats action.
    #[serde(default = "default_stats_log_lines")]
    pub stats_log_lines: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            respawn_timeout_secs: default_respawn_timeout(),
            respawn: RespawnMode::default(),
            log_retention: default_log_retention(),
            stats_log_lines: default_stats_log_lines(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_respawn_timeout() -> u64 {
    5
}

fn default_log_retention() -> usize {
    500
}

fn default_stats_log_lines() -> usize {
    10
}

/// Sandboxed code execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    /// Code tasks refuse to run unless this is set.
    #[serde(default)]
    pub enabled: bool,

    /// Program and leading arguments; the payload is appended as the last argument.
    #[serde(default = "default_interpreter")]
    pub interpreter: Vec<String>,

    #[serde(default = "default_code_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_sandbox_dir")]
    pub work_dir: PathBuf,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interpreter: default_interpreter(),
            timeout_secs: default_code_timeout(),
            work_dir: default_sandbox_dir(),
        }
    }
}

fn default_interpreter() -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string()]
}

fn default_code_timeout() -> u64 {
    30
}

fn default_sandbox_dir() -> PathBuf {
    PathBuf::from("~/.nocron/sandbox")
}

/// Installation endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_install_enabled")]
    pub enabled: bool,

    /// Admin token required by `POST /install` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            enabled: default_install_enabled(),
            token: None,
        }
    }
}

fn default_install_enabled() -> bool {
    true
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("~/.nocron/logs")
}

fn default_max_log_files() -> usize {
    14
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
