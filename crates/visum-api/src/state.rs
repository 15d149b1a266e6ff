//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use visum_core::config::AppConfig;
use visum_core::traits::dispatch::DispatchChannel;
use visum_core::traits::store::JobStore;
use visum_service::{JobOrchestrator, StatusReader, UploadService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Job store handle, used for health checks.
    pub store: Arc<dyn JobStore>,
    /// Dispatch channel handle, used for health checks.
    pub dispatch: Arc<dyn DispatchChannel>,
    /// Job submission and transitions.
    pub orchestrator: Arc<JobOrchestrator>,
    /// Job status reads.
    pub status_reader: Arc<StatusReader>,
    /// Presigned upload issuance.
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    /// Wire the services over the given backends.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn JobStore>,
        dispatch: Arc<dyn DispatchChannel>,
        upload_service: UploadService,
    ) -> Self {
        let orchestrator = JobOrchestrator::new(Arc::clone(&store), Arc::clone(&dispatch));
        let status_reader = StatusReader::new(Arc::clone(&store));
        Self {
            config: Arc::new(config),
            store,
            dispatch,
            orchestrator: Arc::new(orchestrator),
            status_reader: Arc::new(status_reader),
            upload_service: Arc::new(upload_service),
        }
    }
}
