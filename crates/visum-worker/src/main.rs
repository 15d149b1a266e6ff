//! Visum worker: consumes job requests from the dispatch channel and
//! drives each job to a terminal status.

use std::sync::Arc;

use tokio::sync::watch;

use visum_core::config::AppConfig;
use visum_core::error::AppError;
use visum_core::telemetry::init_logging;
use visum_core::types::JobId;
use visum_dispatch::DispatchManager;
use visum_service::JobOrchestrator;
use visum_storage::LocationResolver;
use visum_store::JobStoreManager;
use visum_worker::{DeliveryHandler, HttpSummarizerProcessor, WorkerRunner};

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
        tracing::error!(error = %e, "Worker error");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Visum worker v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(JobStoreManager::new(&config.store).await?);
    let dispatch = Arc::new(DispatchManager::new(&config.dispatch).await?);
    let consumer = dispatch.consumer();

    let orchestrator = JobOrchestrator::new(store, dispatch);
    let processor = Arc::new(HttpSummarizerProcessor::from_config(&config.worker)?);
    let handler = DeliveryHandler::new(
        orchestrator,
        Arc::clone(&consumer),
        LocationResolver::new(config.storage.bucket.clone()),
        processor,
    );

    let worker_id = consumer_name(&config.worker.consumer_name);
    let runner = WorkerRunner::new(consumer, Arc::new(handler), config.worker.clone(), worker_id);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(async move { runner.run(shutdown_rx).await });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    worker
        .await
        .map_err(|e| AppError::internal(format!("Worker task panicked: {e}")))?;
    tracing::info!("Visum worker stopped");
    Ok(())
}

fn consumer_name(configured: &str) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }
    match std::env::var("HOSTNAME") {
        Ok(host) if !host.is_empty() => format!("worker-{host}"),
        _ => format!("worker-{}", &JobId::new().to_string()[..8]),
    }
}

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
}
