//! Crosswalk validation server.
//!
//! Hosts the reconciliation validation API: a streaming cross-system
//! data-integrity checker between a directory service and a profile store.

mod config;
mod logging;

use axum::routing::get;
use axum::Router;
use config::Config;
use crosswalk_api::{recon_router, ProfileStoreSettings, ReconState};
use crosswalk_recon::InMemoryArtifactStore;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values).
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.log_filter);

    // One artifact store per process, injected into both handlers.
    let state = ReconState {
        artifacts: Arc::new(InMemoryArtifactStore::new()),
        profile_store: ProfileStoreSettings {
            base_url: config.profile_store_url.clone(),
            api_key: config.profile_store_api_key.clone(),
            secret: config.profile_store_secret.clone(),
        },
        request_timeout_secs: config.request_timeout_secs,
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(recon_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: failed to bind {}: {e}", config.bind_addr);
            std::process::exit(1);
        }
    };
    info!(addr = %config.bind_addr, "Crosswalk server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Graceful shutdown signal handler.
///
/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                // Fall through - we still want to wait for terminate signal
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                // Wait forever if we can't install the handler
                std::future::pending::<()>().await;
            }
        }
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
