//! CLI definitions for nocron.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// nocron CLI.
#[derive(Parser)]
#[command(name = "nocron")]
#[command(about = "Self-perpetuating interval task runner")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/nocron.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP server in foreground (default)
    Run {
        /// Server host, overrides [server] host
        #[arg(long)]
        host: Option<String>,

        /// Server port, overrides [server] port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Install a new instance and print its worker and manager URLs
    Install {
        /// Task type: "url" or "code"
        #[arg(long, default_value = "url")]
        task_type: String,

        /// URL to fetch, or code to run
        #[arg(long)]
        task: String,

        /// Seconds between ticks (1-3600)
        #[arg(long)]
        interval: String,

        /// Seconds one worker invocation runs before handing off
        #[arg(long)]
        window: String,

        /// Preferred instance suffix; random when omitted or too short
        #[arg(long)]
        suffix: Option<String>,
    },

    /// List installed instances
    List,
}
