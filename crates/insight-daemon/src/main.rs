//! # insight-daemon
//!
//! Notification gateway binary — loads configuration, wires the
//! subsystem, and serves until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use insight_server::config::ServerConfig;
use insight_server::metrics;
use insight_server::server::NotifyGateway;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Insight notification gateway.
#[derive(Parser, Debug)]
#[command(name = "insight-daemon", about = "Insight realtime notification gateway")]
struct Cli {
    /// Host to bind (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to a JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config =
        ServerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let recorder = metrics::install_recorder();
    let gateway = NotifyGateway::new(config).with_metrics(recorder);

    let shutdown = gateway.shutdown().clone();
    let _signal_task = tokio::spawn(async move { shutdown.on_ctrl_c().await });

    info!("starting insight notification gateway");
    gateway.serve().await.context("gateway exited with error")?;
    info!("gateway stopped");
    Ok(())
}
