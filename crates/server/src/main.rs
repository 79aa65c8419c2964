//! sieve server entry point.
//!
//! Loads configuration, builds the response cache and fetcher, and serves the
//! extraction endpoint over HTTP until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sieve_client::{FetchConfig, HttpFetcher};
use sieve_core::{AppConfig, ResponseCache};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod args;
mod error;
mod handler;
mod params;

use args::Args;
use handler::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load()?;
    args.apply(&mut config);
    config.validate()?;

    let cache = ResponseCache::new(config.cache_capacity(), config.cache_ttl());
    let fetcher = HttpFetcher::new(FetchConfig::from(&config))?;
    let sweeper = cache.spawn_sweeper(config.sweep_interval());

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to open listener on {addr}"))?;

    tracing::info!(
        address = %listener.local_addr()?,
        cache_capacity = config.cache_capacity,
        cache_ttl_secs = config.cache_ttl_secs,
        "server started"
    );

    let app = handler::router(AppState::new(cache, Arc::new(fetcher)));
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
