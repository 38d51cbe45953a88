//! ARK NAAN resolver
//!
//! Redirects `ark:/NAAN/remainder` requests to the target registered for
//! the NAAN, or returns the authority record when asked with `?info`.
//!
//! # Architecture Overview
//!
//! ```text
//! Client Request
//!     → http::server (axum router, middleware)
//!     → ark::identifier (parse NAAN / remainder)
//!     → ark::resolver ──▶ store (naans/<naan>.json)
//!     → http::response (redirect, record JSON, 404)
//! Client Response
//!
//! Cross-cutting: config · observability · lifecycle
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use arkr::config::validation::validate_config;
use arkr::config::{load_config, ConfigError, ResolverConfig};
use arkr::observability::{logging, metrics};
use arkr::{FileRecordStore, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "arkr")]
#[command(about = "ARK NAAN resolver service", version)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `store.data_dir`.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<ResolverConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ResolverConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.store.data_dir = dir.clone();
    }
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init(&config.observability)?;

    tracing::info!("arkr v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        data_dir = %config.store.data_dir.display(),
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    if !config.store.data_dir.is_dir() {
        tracing::warn!(
            data_dir = %config.store.data_dir.display(),
            "Data directory not found"
        );
    }
    let store = Arc::new(FileRecordStore::new(
        config.store.data_dir.clone(),
        config.store.cache_records,
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
