//! Visum Server: video summarization job API.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use visum_api::{AppState, build_app, run_server};
use visum_core::config::AppConfig;
use visum_core::error::AppError;
use visum_core::telemetry::init_logging;
use visum_dispatch::DispatchManager;
use visum_service::UploadService;
use visum_storage::providers::S3PresignProvider;
use visum_store::JobStoreManager;

#[tokio::main]
async fn main() {
    let env = std::env::var("VISUM_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Visum v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Job store ────────────────────────────────────────
    tracing::info!(provider = %config.store.provider, "Initializing job store...");
    let store = Arc::new(JobStoreManager::new(&config.store).await?);

    // ── Step 2: Dispatch channel ─────────────────────────────────
    tracing::info!(
        provider = %config.dispatch.provider,
        stream = %config.dispatch.stream_name(),
        "Initializing dispatch channel..."
    );
    let dispatch = Arc::new(DispatchManager::new(&config.dispatch).await?);

    // ── Step 3: Object storage ───────────────────────────────────
    tracing::info!(bucket = %config.storage.bucket, "Initializing object storage...");
    let presign = Arc::new(S3PresignProvider::new(&config.storage).await?);
    let upload_service = UploadService::new(presign, &config.storage);

    // ── Step 4: HTTP server ──────────────────────────────────────
    let server_config = config.server.clone();
    let state = AppState::new(config, store, dispatch, upload_service);
    let app = build_app(state.clone(), &server_config.cors);

    run_server(app, &server_config, shutdown_signal()).await?;

    // ── Step 5: Release backend connections ──────────────────────
    tracing::info!(
        store = %state.store.provider_type(),
        dispatch = %state.dispatch.provider_type(),
        "Closing backend connections"
    );
    drop(state);

    tracing::info!("Visum server shut down gracefully");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
