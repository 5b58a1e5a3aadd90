//! shinobi-web - Naruto character browser
//!
//! Serves the JSON API and HTML pages on top of the primary and fallback
//! character APIs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shinobi_common::config::{ConfigOverrides, ServiceConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use shinobi_web::{build_router, AppState, CharacterFetcher};

/// Command-line arguments for shinobi-web
///
/// Each flag beats its environment variable, which beats the config file.
#[derive(Parser, Debug)]
#[command(name = "shinobi-web")]
#[command(about = "Kid-friendly Naruto character browser")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "SHINOBI_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SHINOBI_PORT")]
    port: Option<u16>,

    /// Primary characters collection URL
    #[arg(long, env = "NARUTO_API")]
    primary_url: Option<String>,

    /// Fallback characters collection URL
    #[arg(long, env = "NARUTO_FALLBACK")]
    fallback_url: Option<String>,

    /// TOML config file
    #[arg(short, long, env = "SHINOBI_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (ignored when RUST_LOG is set)
    #[arg(long, env = "SHINOBI_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise start at info and switch once the config is read
    let rust_log = EnvFilter::try_from_default_env().ok();
    let from_env = rust_log.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(rust_log.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting shinobi-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        primary_url: args.primary_url,
        fallback_url: args.fallback_url,
        log_level: args.log_level,
    };
    let config = ServiceConfig::resolve(args.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    if !from_env {
        let level = EnvFilter::try_new(&config.logging.level)
            .with_context(|| format!("Invalid log level: {}", config.logging.level))?;
        filter_handle
            .reload(level)
            .context("Failed to apply log level")?;
    }

    let fetcher =
        CharacterFetcher::new(&config.upstream).context("Failed to build upstream client")?;
    info!(
        "Primary source: {} (native pagination: {})",
        fetcher.primary().url,
        fetcher.primary().native_pagination
    );
    info!(
        "Fallback source: {} (native pagination: {})",
        fetcher.fallback().url,
        fetcher.fallback().native_pagination
    );

    let app = build_router(AppState::new(fetcher));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("shinobi-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
