//! Ralali search proxy.
//!
//! Accepts seller/product search requests, forwards them to the Ralali search
//! gateway and reshapes the answer.
//!
//! ```text
//!     Client                ┌───────────────────────────────────────────┐
//!     POST /search/v3/...   │  http ──▶ upstream::client ──────────────┼──▶ Ralali API
//!     ─────────────────────▶│                  │                        │
//!                           │                  ├─ credentials (refresh) │
//!     ◀─────────────────────│  JSON ◀── upstream::normalize ◀──────────┼─── response
//!                           └───────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ralali_proxy::config::{apply_env_overrides, load_config, validate_config, ConfigError, ProxyConfig};
use ralali_proxy::observability::{logging, metrics};
use ralali_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "ralali-proxy")]
#[command(about = "Search proxy for the Ralali marketplace API", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "RALALI_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config);
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);

    tracing::info!("ralali-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        method = ?config.upstream.method,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.upstream.auth_token.is_empty() {
        tracing::warn!("No upstream auth token configured; searches will likely be rejected");
    }

    if config.observability.metrics_enabled {
        // Already validated.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
