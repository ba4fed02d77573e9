//! algod-gateway
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                  ALGOD GATEWAY                    │
//!   Client Request     │  ┌────────────┐   ┌────────────┐   ┌───────────┐  │
//!   ───────────────────┼─▶│ http layer │──▶│ rate limit │──▶│ handlers  │  │
//!                      │  │ (axum)     │   │ (/api/*)   │   │           │  │
//!                      │  └────────────┘   └────────────┘   └─────┬─────┘  │
//!                      │                                          │        │
//!                      │        ┌──────────────┬──────────────────┤        │
//!                      │        ▼              ▼                  ▼        │
//!                      │  ┌───────────┐ ┌──────────────┐ ┌──────────────┐  │
//!                      │  │credential │ │ tx builder / │ │ confirmation │  │
//!                      │  │ validator │ │    signer    │ │    poller    │  │
//!                      │  └───────────┘ └──────┬───────┘ └──────┬───────┘  │
//!                      │                       └────────┬───────┘          │
//!                      │                                ▼                  │
//!                      │                        ┌──────────────┐           │
//!                      │                        │ node client  │───────────┼──▶ algod
//!                      │                        └──────────────┘           │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use algod_gateway::blockchain::{AlgodClient, NodeClient};
use algod_gateway::config::{load_config, load_node_token, validation::validate_config, ConfigError};
use algod_gateway::lifecycle::{spawn_signal_listener, Shutdown};
use algod_gateway::observability::{logging, metrics};
use algod_gateway::{GatewayConfig, GatewayServer};

#[derive(Parser)]
#[command(name = "algod-gateway")]
#[command(about = "HTTP gateway for an Algorand node", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = GatewayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "algod-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        node_address = %config.node.address,
        rate_limit_enabled = config.rate_limit.enabled,
        max_rounds_to_wait = config.confirmation.max_rounds_to_wait,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let token = load_node_token(&config.node);
    let client = AlgodClient::new(&config.node, &token)?;
    match client.status().await {
        Ok(status) => tracing::info!(last_round = status.last_round, "Node reachable"),
        Err(e) => tracing::warn!(error = %e, "Node not reachable yet, serving anyway"),
    }
    let node: Arc<dyn NodeClient> = Arc::new(client);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = GatewayServer::new(&config, node);
    server.run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
