//! xss-guard: inline HTTP request guard.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ TraceLayer ─▶ RequestId ─▶ Timeout ─▶ RequestGuard ──▶ handler
//!                                                       │   │
//!                                     429/413/400 ◀─────┘   │ XSS detected
//!                                                           ▼
//!                                                       LogQueue (bounded, drop when full)
//!                                                           │
//!                                                       LogWorker ──▶ cache (staged + index)
//!                                                                        │
//!                                                       LogArchiver ◀────┘ every interval
//!                                                           │
//!                                                           ▼
//!                                                       durable store
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use xss_guard::audit::{store, MemoryCache};
use xss_guard::config::{self, GuardConfig};
use xss_guard::http::{default_handler, HttpServer};
use xss_guard::lifecycle::Shutdown;
use xss_guard::observability;

#[derive(Parser)]
#[command(name = "xss-guard")]
#[command(about = "Inline HTTP guard against floods, oversized requests, and XSS", long_about = None)]
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
    observability::logging::init_logging();

    tracing::info!("xss-guard v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GuardConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        if let Err(errors) = config::validation::validate_config(&config) {
            return Err(config::ConfigError::Validation(errors).into());
        }
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_bytes = config.guard.max_body_bytes,
        rate_capacity = config.rate_limit.capacity,
        rate_refill = config.rate_limit.refill_per_second,
        archive_interval_secs = config.archive.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let cache = Arc::new(MemoryCache::new());
    let durable = store::durable_from_config(&config.archive)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config, default_handler(), cache, durable);
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
