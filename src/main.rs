//! Storefront Cache - availability-first caching and rate limiting for a storefront API
//!
//! Server binary: wires configuration, the cache store and the product
//! catalog into the HTTP router.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_cache::api::create_router;
use storefront_cache::catalog::{InMemoryCatalog, ProductRepository};
use storefront_cache::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the storefront cache server.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Load the product catalog
/// 4. Connect the cache store (falls back to in-process storage on failure)
/// 5. Start background fallback cleanup task
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // RUST_LOG overrides the environment-derived default
    let default_filter = if config.verbose_logging() {
        "storefront_cache=debug,tower_http=debug"
    } else {
        "storefront_cache=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        environment = %config.environment,
        version = %config.version,
        port = config.server_port,
        cleanup_interval = config.cleanup_interval,
        "Starting storefront cache server"
    );

    let catalog: Arc<dyn ProductRepository> = match &config.catalog_path {
        Some(path) => Arc::new(InMemoryCatalog::from_path(path)?),
        None => {
            warn!("CATALOG_PATH not set, starting with an empty catalog");
            Arc::new(InMemoryCatalog::default())
        }
    };

    let state = AppState::from_config(&config, catalog);
    let connection = state.cache.initialize().await;
    info!(state = ?connection, "Cache store initialized");

    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cleanup_interval);
    let cache = state.cache.clone();

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cleanup_handle))
    .await
    .context("server error")?;

    cache.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
