//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use nocron_config::{Config, RespawnMode};
use nocron_core::{ControlPlane, Installer};
use nocron_protocols::{InstanceStore, Respawner, TaskExecutor};
use nocron_runloop::{
    CodeSandbox, DispatchExecutor, HttpRespawner, LocalRelay, LocalRespawner, RemoteFetchExecutor,
    SandboxedCodeExecutor, SchedulerLoop,
};

/// State shared across handlers.
pub struct AppState {
    pub scheduler: SchedulerLoop,
    pub control: ControlPlane,
    /// `None` when installation over HTTP is disabled.
    pub installer: Option<Installer>,
    pub install_token: Option<String>,
    start_time: Instant,
}

impl AppState {
    pub fn new(scheduler: SchedulerLoop, control: ControlPlane) -> Self {
        Self {
            scheduler,
            control,
            installer: None,
            install_token: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_installer(mut self, installer: Installer, token: Option<String>) -> Self {
        self.installer = Some(installer);
        self.install_token = token;
        self
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Wire executors, respawner and control plane from configuration.
///
/// In `local` respawn mode the returned relay must stay alive for as long as
/// the server runs.
pub fn build_state(
    config: &Config,
    store: Arc<dyn InstanceStore>,
) -> (Arc<AppState>, Option<LocalRelay>) {
    let base_url = config.server.base_url();

    let fetch: Arc<dyn TaskExecutor> = Arc::new(RemoteFetchExecutor::new(Duration::from_secs(
        config.worker.fetch_timeout_secs,
    )));
    let code: Arc<dyn TaskExecutor> = Arc::new(SandboxedCodeExecutor::new(CodeSandbox {
        enabled: config.code.enabled,
        interpreter: config.code.interpreter.clone(),
        timeout: Duration::from_secs(config.code.timeout_secs),
        work_dir: nocron_config::ConfigLoader::expand_path(&config.code.work_dir),
    }));
    if config.code.enabled {
        warn!("Code tasks are enabled; payloads run as child processes of this server");
    }
    let executor: Arc<dyn TaskExecutor> = Arc::new(DispatchExecutor::new(fetch, code));

    let control =
        ControlPlane::new(store.clone()).with_stats_log_lines(config.worker.stats_log_lines);

    let (scheduler, relay) = match config.worker.respawn {
        RespawnMode::Http => {
            let respawner: Arc<dyn Respawner> = Arc::new(HttpRespawner::new(
                base_url.clone(),
                Duration::from_secs(config.worker.respawn_timeout_secs),
            ));
            info!(base_url = %base_url, "Respawn through worker URL");
            (SchedulerLoop::new(store.clone(), executor, respawner), None)
        }
        RespawnMode::Local => {
            let (respawner, receiver) = LocalRespawner::channel();
            let scheduler = SchedulerLoop::new(store.clone(), executor, Arc::new(respawner));
            let relay = LocalRelay::spawn(scheduler.clone(), receiver);
            info!("Respawn through in-process relay");
            (scheduler, Some(relay))
        }
    };

    let mut state = AppState::new(scheduler, control);
    if config.install.enabled {
        state = state.with_installer(
            Installer::new(store, base_url),
            config.install.token.clone().filter(|t| !t.is_empty()),
        );
    }

    (Arc::new(state), relay)
}
