//! Climate API Server
//!
//! Read-only reporting API over daily precipitation and temperature
//! observations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use climate_api::build_router;
use climate_api::config::ApiConfig;
use climate_api::state::AppState;

/// Climate API Server
#[derive(Parser, Debug)]
#[command(name = "climate-api")]
#[command(about = "Read-only HTTP API over daily climate observations")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "CLIMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides config and environment)
    #[arg(short, long)]
    listen: Option<String>,

    /// SQLite database URL (overrides config and environment)
    #[arg(long)]
    database_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "CLIMATE_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

fn load_config(args: &Args) -> Result<ApiConfig> {
    let mut config = match &args.config {
        Some(path) => ApiConfig::load_from_file(path)?,
        None => ApiConfig::default(),
    }
    .apply_env();

    if let Some(listen) = &args.listen {
        config.listen = listen.clone();
    }
    if let Some(url) = &args.database_url {
        config.database.url = url.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting climate API server");

    let config = load_config(&args)?;

    // Connect and verify the store before accepting requests
    let state = AppState::new(&config)
        .await
        .context("Failed to initialize application state")?
        .with_metrics(prometheus_handle);

    let app = build_router(Arc::new(state));

    let addr = config.listen_addr()?;
    info!("Climate API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    info!("Climate API stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");
}
