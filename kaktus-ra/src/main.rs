//! kaktus-ra - Review Analyzer service
//!
//! **Module Identity:**
//! - Name: kaktus-ra (Review Analyzer)
//! - Port: 5730 (default)
//!
//! Classifies customer reviews, extracts insights from Positive/Negative
//! reviews and summarizes them as delighters and detractors.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kaktus_common::config::ConfigLoader;
use kaktus_ra::{build_router, AppState};

/// Command line arguments (highest configuration priority)
#[derive(Debug, Parser)]
#[command(name = "kaktus-ra", version, about = "Customer review analyzer")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "KAKTUS_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Default log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loaded before tracing so the configured level can seed the filter
    let loader = ConfigLoader::new("kaktus-ra").with_path(cli.config.clone());
    let mut config = loader.load().context("Failed to load configuration")?;

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting kaktus Review Analyzer (kaktus-ra) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match loader.config_path() {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (compiled defaults)"),
    }
    info!(
        "Provider: {} (model {}), min interval {} ms, batch size {}",
        config.provider.base_url,
        config.provider.model,
        config.analysis.min_interval_ms,
        config.analysis.batch_size
    );

    let state = AppState::from_config(&config);
    let shutdown = state.shutdown.clone();

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received, cancelling in-flight analyses");
            shutdown.cancel();
        })
        .await?;

    info!("kaktus-ra stopped");
    Ok(())
}
