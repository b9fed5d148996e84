//! Download gate server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ audit ─▶ gate ─▶ static content
//!                                                        │        │
//!                                                        │        ├─ deny      → 403 + reason
//!                                                        │        └─ challenge → script page
//!                                                        ▼
//!                                          spawned: geo cache lookup → audit line
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use download_gate::config::{load_config, GateConfig};
use download_gate::lifecycle::{shutdown_signal, Shutdown};
use download_gate::observability::{logging, metrics};
use download_gate::HttpServer;

#[derive(Parser)]
#[command(name = "download-gate")]
#[command(about = "Serves protected downloads to browsers, not scripts", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("download-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config_path = ?cli.config,
        bind_address = %config.listener.bind_address,
        content_root = %config.content.root,
        checks_configured = config.download_check.is_some(),
        geo_max_entries = config.geo.max_entries,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
