//! Request normalizer (v1)
//!
//! Serves an echo endpoint behind the normalization middleware.
//!
//! ```text
//!     Client ──▶ reverse proxy ──▶ ┌──────────────────────────────────────────┐
//!                (x-forwarded-*)   │ trace → request id → timeout → normalize │
//!                                  │        │                                 │
//!                                  │        ▼                                 │
//!                                  │   echo handler (RequestContext + body)   │
//!                                  └──────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_normalizer::config::{load_config, NormalizerConfig};
use request_normalizer::observability::{logging, metrics};
use request_normalizer::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "request-normalizer")]
#[command(about = "Serve requests through the normalization layer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => NormalizerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("request-normalizer v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        secure = config.listener.secure,
        max_body_size = config.body.max_size,
        forwarding_enabled = config.forwarding.enabled,
        overrides_enabled = config.overrides.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
