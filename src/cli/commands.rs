use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use super::demo::demo_engine;
use crate::config::ServerConfig;
use crate::logging::init_logging;
use crate::App;

/// Command-line interface for triechain
#[derive(Parser)]
#[command(name = "triechain")]
#[command(about = "Prefix-trie router demo server", long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "TRIECHAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo application
    Serve {
        /// Listen address, overrides the configuration
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// List registered routes per method
    Routes,
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Fails on invalid configuration, route registration errors, logging setup
/// or a server that cannot bind or stops abnormally.
pub fn run_cli(cli: Cli) -> Result<()> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.addr = addr;
            }
            let _guard = init_logging(&config.log)?;
            config.apply_runtime();

            let engine = demo_engine(&config).context("Failed to build demo application")?;
            info!(addr = %config.addr, "Starting server");
            engine
                .run(config.addr.as_str())
                .with_context(|| format!("Server on {} failed", config.addr))
        }
        Commands::Routes => {
            let app = demo_engine(&config)
                .context("Failed to build demo application")?
                .build();
            print!("{}", render_routes(&app));
            Ok(())
        }
    }
}

/// One `METHOD pattern` line per route, sorted by method then pattern.
pub(crate) fn render_routes(app: &App) -> String {
    let mut routes = app.router().routes();
    routes.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
    routes
        .into_iter()
        .map(|(method, pattern)| format!("{:<7} {pattern}\n", method.as_str()))
        .collect()
}
