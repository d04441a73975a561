use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tally::config::{LogFormat, StorageBackend, TallyConfig};
use tally::http::{AppState, HttpServer};
use tally::ledger::{JsonFileStore, MemoryStore, TransactionStore};
use tally::ratelimit::RateLimiter;

/// Personal finance transaction API with per-client rate limiting.
#[derive(Parser, Debug)]
#[command(name = "tally", version)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides `server.http_addr`)
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Log filter directive (overrides `logging.level`)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (overrides `logging.format`)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TallyConfig::from_file(path)?,
        None => TallyConfig::default(),
    };
    if let Some(addr) = args.addr {
        config.server.http_addr = addr;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(true)
            .init(),
    }

    info!("Starting Tally");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(http_addr = %config.server.http_addr, "Configuration loaded");

    // Initialize the rate limiter and its background sweep
    let settings = config.rate_limiting.to_settings()?;
    let rate_limiter = Arc::new(RateLimiter::new(settings));
    let sweeper = rate_limiter.start_sweeper();
    info!(
        max_requests = settings.max_requests,
        window_ms = config.rate_limiting.window_ms,
        block_ms = config.rate_limiting.block_ms,
        max_entries = settings.max_entries,
        "Rate limiter initialized"
    );

    let store: Arc<dyn TransactionStore> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory transaction store");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::JsonFile => {
            let store = JsonFileStore::new(&config.storage.path);
            info!(path = %store.path().display(), "Using JSON file transaction store");
            Arc::new(store)
        }
    };

    let server = HttpServer::new(
        config.server.http_addr,
        AppState::new(Arc::clone(&rate_limiter), store),
    );

    // Run the server with graceful shutdown on Ctrl+C
    let result = server.serve_with_shutdown(shutdown_signal()).await;

    sweeper.shutdown().await;
    result?;

    info!("Tally stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
