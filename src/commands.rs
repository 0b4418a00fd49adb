//! One-shot CLI commands.

use nocron_config::Config;
use nocron_core::{InstallRequest, Installer, TaskCandidate};
use nocron_protocols::{PauseSignalStore, TaskStore};

use crate::server::open_store;

/// `nocron install`
pub(crate) async fn install(
    config: &Config,
    suffix: Option<String>,
    candidate: TaskCandidate,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    let installer = Installer::new(store, config.server.base_url());

    let receipt = installer.install(InstallRequest { suffix, candidate }).await?;

    println!("Installed instance '{}'", receipt.suffix);
    println!();
    println!("  secret:  {}", receipt.secret);
    println!("  worker:  {}", receipt.worker_url);
    println!("  manager: {}", receipt.manager_url);
    println!();
    println!("Open the worker URL once to start the loop.");
    Ok(())
}

/// `nocron list`
pub(crate) async fn list(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    let suffixes = store.list_suffixes().await?;

    if suffixes.is_empty() {
        println!("No instances installed in {}", store.root().display());
        return Ok(());
    }

    println!(
        "{:<22} {:<6} {:>9} {:>9}  {}",
        "SUFFIX", "TYPE", "INTERVAL", "WINDOW", "STATE"
    );
    for suffix in suffixes {
        match store.load_task(&suffix).await {
            Ok(Some(task)) => {
                let state = if store.is_paused(&suffix).await.unwrap_or(false) {
                    "paused"
                } else {
                    "active"
                };
                println!(
                    "{:<22} {:<6} {:>8}s {:>8}s  {}",
                    suffix,
                    task.kind(),
                    task.interval_secs(),
                    task.window_secs(),
                    state
                );
            }
            Ok(None) => {}
            Err(e) => println!("{:<22} unreadable: {}", suffix, e),
        }
    }
    Ok(())
}
