//! Edge stream publisher.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────────────┐
//!     ────────────────────┼─▶ http::server ──▶ handler ──▶ stream::service        │
//!                         │   (request id,     (parse,      (status check,       │
//!                         │    trace, limits)   validate,    `message` extract)  │
//!                         │                     digest)            │             │
//!                         │                                        ▼             │
//!     Client Response     │                                 stream::client ──────┼──▶ GDN stream app
//!     ◀───────────────────┼── JSON + Content-Language ◀───────────────────────────┼───
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_stream_publisher::config::{load_config, PublisherConfig};
use edge_stream_publisher::observability::{logging, metrics};
use edge_stream_publisher::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "edge-stream-publisher")]
#[command(about = "Publishes SMS auth events to a Macrometa stream", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "PUBLISHER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => PublisherConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("edge-stream-publisher v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_path = ?args.config,
        bind_address = %config.listener.bind_address,
        c8_url = %config.stream.c8_url,
        fabric = %config.stream.fabric,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
