//! raster-check - programme schedule reconciliation dashboard
//!
//! Compares the website's event calendar with the LibreTime automation
//! schedule and serves the discrepancies on a single page.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raster_check::config::{Args, Config};
use raster_check::feeds::HttpFeeds;
use raster_check::reload::Reloader;
use raster_check::state::SnapshotStore;
use raster_check::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raster_check=info,raster_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting raster-check v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = Config::from_args(Args::parse()).context("Invalid configuration")?;
    info!("Website: {}", config.website_url);
    info!("LibreTime: {}", config.libretime_url);
    info!("Look-ahead: {} days", config.days);

    let feeds = HttpFeeds::new(
        config.website_url.clone(),
        config.libretime_url.clone(),
        config.fetch_timeout,
    )
    .context("Failed to create HTTP client")?;

    let store = SnapshotStore::new();
    let reloader = Arc::new(Reloader::new(
        Arc::new(feeds),
        store.clone(),
        config.reconcile.clone(),
        config.days,
    ));

    // Serve even if the first load fails; the page shows the error
    if let Err(e) = reloader.reload().await {
        warn!("Initial load failed: {}", e);
    }

    let app = build_router(AppState::new(store, reloader));

    match &config.tls {
        Some(tls) => {
            let rustls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .context("Failed to load TLS certificate/key")?;

            let handle = axum_server::Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            info!("raster-check listening on https://{}", config.listen_addr);
            axum_server::bind_rustls(config.listen_addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("Server error")?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(config.listen_addr)
                .await
                .context("Failed to bind to address")?;

            info!("raster-check listening on http://{}", config.listen_addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Server error")?;
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
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
