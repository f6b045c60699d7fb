//! gitview node - serves git repositories over HTTP.

use anyhow::Context;
use clap::Parser;
use gitview_node::config::NodeConfig;
use gitview_node::observability::{init_logging, LogFormat};
use gitview_node::{bootstrap, build_router};
use std::net::SocketAddr;
use std::path::PathBuf;

/// gitview - a web front-end for bare git repositories
#[derive(Parser, Debug)]
#[command(name = "gitview-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address
    #[arg(long)]
    bind_addr: Option<SocketAddr>,

    /// Folder containing bare repositories
    #[arg(long)]
    repositories: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    /// Command line flags override the configuration file.
    fn apply(self, config: &mut NodeConfig) {
        if let Some(addr) = self.bind_addr {
            config.server.bind_addr = addr;
        }
        if let Some(dir) = self.repositories {
            config.repositories.base_dir = dir;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = NodeConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    init_logging(
        &config.logging.level,
        LogFormat::parse(&config.logging.format),
    );
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting gitview node");

    let state = bootstrap(&config).context("Failed to load repositories")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
