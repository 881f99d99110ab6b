//! balizas-v16 - live V16 warning beacon feed over HTTP.
//!
//! Serves the cached beacon snapshot as JSON. Each request to the beacon
//! endpoint runs a refresh cycle against the DGT incident feed; an optional
//! background refresh can keep the cache warm between requests.

mod handlers;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use balizas_core::{BeaconCache, Config, FeedSource};
use tokio::signal;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered log lines on drop.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stderr keeps stdout clean for --dump
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let config = Config::load().context("Failed to load configuration")?;
    let cache = Arc::new(BeaconCache::from_config(&config)?);

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--dump" {
        return dump_snapshot(&*cache).await;
    }

    if let Some(interval) = config.refresh_interval() {
        spawn_periodic_refresh(Arc::clone(&cache), interval);
    }

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(feed = config.feed_url(), "balizas-v16 listening on http://{}", addr);
    info!("  GET http://{}{} - beacon snapshot", addr, handlers::BEACONS_ROUTE);
    info!("  GET http://{}/health - health check", addr);

    axum::serve(listener, handlers::router(cache))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Run a single refresh cycle and print the snapshot as JSON to stdout
async fn dump_snapshot<S: FeedSource>(cache: &BeaconCache<S>) -> Result<()> {
    let snapshot = cache.refresh().await?;
    let json = serde_json::to_string_pretty(&*snapshot)?;
    println!("{}", json);
    Ok(())
}

/// Keep the cache warm between requests. Failures are already logged by the
/// cache and simply wait for the next tick.
fn spawn_periodic_refresh<S>(cache: Arc<BeaconCache<S>>, interval: Duration)
where
    S: FeedSource + 'static,
{
    info!(interval_secs = interval.as_secs(), "Background refresh enabled");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let _ = cache.refresh().await;
        }
    });
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
