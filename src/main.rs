//! nocron - self-perpetuating interval task runner
//!
//! Main entry point for the nocron CLI and server.

mod cli;
mod commands;
mod server;

use clap::Parser;
use tracing::{error, warn};

use nocron_config::{Config, ConfigLoader, ConfigValidator};
use nocron_core::TaskCandidate;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    server::init_tracing(&config.logging)?;

    match cli.command {
        None => start(config).await,
        Some(Commands::Run { host, port }) => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            start(config).await
        }
        Some(Commands::Install {
            task_type,
            task,
            interval,
            window,
            suffix,
        }) => {
            let candidate = TaskCandidate {
                task_type: Some(task_type),
                task_code: Some(task),
                interval: Some(interval),
                window: Some(window),
            };
            commands::install(&config, suffix, candidate).await
        }
        Some(Commands::List) => commands::list(&config).await,
    }
}

/// Validate the configuration, then serve.
async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(&config);
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        for e in &result.errors {
            error!("Config {}: {}", e.path, e.message);
        }
        return Err(format!("invalid configuration ({} errors)", result.errors.len()).into());
    }

    server::run_server(config).await
}
