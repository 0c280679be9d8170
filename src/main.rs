//! Dockroute - label-driven routing configuration for Docker and Swarm
//!
//! This is the main CLI entry point for Dockroute.

use clap::{Parser, Subcommand};
use dockroute::dynamic::Configuration;
use dockroute::error::Result;
use dockroute::provider::{Provider, ProviderConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Dockroute - routing configuration from container labels
#[derive(Parser)]
#[command(name = "dockroute")]
#[command(version)]
#[command(about = "Builds reverse-proxy routing configuration from Docker labels", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Provider settings file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Docker Engine API endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Domain for default Host rules
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Discover Swarm services instead of containers
    #[arg(long, global = true)]
    swarm: bool,

    /// Expose units that carry no enable label
    #[arg(long, global = true)]
    exposed_by_default: Option<bool>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current configuration once
    Dump,

    /// Poll the engine and print every new configuration
    Watch,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dockroute").join("config.yaml"))
}

fn load_settings(path: Option<&Path>) -> Result<ProviderConfig> {
    match path {
        Some(path) => ProviderConfig::load(path),
        None => match default_config_path() {
            Some(path) if path.exists() => ProviderConfig::load(&path),
            _ => Ok(ProviderConfig::default()),
        },
    }
}

impl Cli {
    fn settings(&self) -> Result<ProviderConfig> {
        let mut settings = load_settings(self.config.as_deref())?;

        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(domain) = &self.domain {
            settings.domain = domain.clone();
        }
        if self.swarm {
            settings.swarm_mode = true;
        }
        if let Some(exposed) = self.exposed_by_default {
            settings.exposed_by_default = exposed;
        }

        settings.validated()
    }
}

fn print_config(config: &Configuration) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = cli.settings()?;
    info!(
        endpoint = %settings.endpoint,
        swarm = settings.swarm_mode,
        "Starting provider"
    );

    match cli.command {
        Commands::Dump => {
            let provider = Provider::from_config(settings)?;
            let config = provider.snapshot().await?;
            print_config(&config)?;
        }

        Commands::Watch => {
            let provider = Provider::from_config(settings)?;
            let (tx, mut rx) = watch::channel(Arc::new(Configuration::default()));
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let printer = tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let config = rx.borrow_and_update().clone();
                    if let Err(e) = print_config(&config) {
                        warn!("Failed to print configuration: {}", e);
                    }
                }
            });

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received interrupt, shutting down");
                    let _ = shutdown_tx.send(true);
                }
            });

            provider.run(&tx, shutdown_rx).await;
            drop(tx);
            let _ = printer.await;
        }
    }

    Ok(())
}
