//! Intercept Callback Service
//!
//! # Architecture Overview
//!
//! ```text
//!   interceptor ──POST /v1/request──▶ RequestProcessor ──▶ Modifications
//!               ──POST /v1/response─▶ ResponseProcessor
//!                                       │ CommandResolver (show / inject / replace / debug)
//!                                       │ TransformOrchestrator
//!                                       │     ├─ CacheManager ──▶ content store
//!                                       │     └─ extract → transform → reconstruct
//!                                       ▼
//!                                     ResponseFinalizer ──▶ ProcessingResult
//!
//!   operator ───GET /v1/stats, POST /v1/stats/reset──▶ StatsAggregator
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use intercept_callback::config::{load_config, ServiceConfig};
use intercept_callback::observability::{logging, metrics};
use intercept_callback::{CallbackService, HttpServer};

#[derive(Parser)]
#[command(name = "intercept-callback")]
#[command(about = "Callback service for an intercepting proxy", long_about = None)]
struct Args {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long, env = "CALLBACK_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("intercept-callback v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store = ?config.store.backend,
        request_timeout_secs = config.timeouts.request_secs,
        dedupe_inflight = config.transform.dedupe_inflight,
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

    let service = Arc::new(CallbackService::from_config(&config)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for callbacks");

    HttpServer::new(&config, service).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
