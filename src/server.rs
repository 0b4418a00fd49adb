//! Tracing setup and the `run` command.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use nocron_api::{ApiServer, ServerSettings, build_state};
use nocron_config::{Config, ConfigLoader, LoggingConfig};
use nocron_store::FileInstanceStore;

/// Initialize tracing with console and rolling file output.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = ConfigLoader::expand_path(&logging.dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("nocron")
        .filename_suffix("log")
        .max_log_files(logging.max_files.max(1))
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop; keep it for the life of the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    Ok(())
}

/// Open the instance store named by the configuration.
pub(crate) async fn open_store(
    config: &Config,
) -> Result<Arc<FileInstanceStore>, Box<dyn std::error::Error>> {
    let root = ConfigLoader::expand_path(&config.storage.path);
    let store = FileInstanceStore::new(root)
        .await?
        .with_log_retention(config.worker.log_retention);
    Ok(Arc::new(store))
}

/// Run the server in foreground until Ctrl-C.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting nocron v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config).await?;
    info!("Instance store at {}", store.root().display());

    let (state, relay) = build_state(&config, store);
    if state.installer.is_some() && state.install_token.is_none() {
        warn!("POST /install is enabled without a token");
    }

    let server = ApiServer::new(
        ServerSettings::new(config.server.host.clone(), config.server.port),
        state,
    );
    info!("Public base URL: {}", config.server.base_url());

    let result = server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await;

    if let Some(relay) = relay {
        relay.shutdown();
    }
    result
}
