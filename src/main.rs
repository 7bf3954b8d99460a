//! Memory gateway
//!
//! Exposes a memory-layer backend as MCP tools and resources.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────┐
//!                         │                 MEMORY GATEWAY                  │
//!                         │                                                 │
//!   JSON-RPC client       │  ┌────────┐   ┌──────────┐   ┌────────────┐     │
//!   ──── POST /mcp ───────┼─▶│  http  │──▶│ protocol │──▶│  dispatch  │──┐  │
//!                         │  │ server │   │ handler  │   │ dispatcher │  │  │
//!                         │  └───┬────┘   └──────────┘   └─────┬──────┘  │  │
//!                         │      │                             │         │  │
//!   native client         │      │ fallback              ┌─────▼──────┐  │  │
//!   ──── /* ──────────────┼──────┴──▶ passthrough ──────▶│  backend   │◀─┘  │
//!                         │                              │   client   │─────┼──▶ memory layer
//!                         │                              └────────────┘     │
//!                         │  routing: discovery → classifier → table (once) │
//!                         └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use memory_gateway::config::{load_config, load_from_env};
use memory_gateway::lifecycle::{self, Shutdown};
use memory_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "memory-gateway")]
#[command(about = "MCP gateway in front of the memory layer", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "memory-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.url,
        timeout_secs = config.backend.timeout_secs,
        max_connections = config.backend.max_connections,
        discovery = ?config.routes.discovery,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)
            .map_err(|e| lifecycle::StartupError::Metrics(e.to_string()))?;
    }

    let server = lifecycle::bootstrap(config).await?;
    let listener = lifecycle::startup::bind(server.config()).await?;

    let shutdown = Shutdown::new();
    server
        .run(listener, lifecycle::shutdown_signal(shutdown.subscribe()))
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
