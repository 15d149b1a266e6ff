//! Job processor trait and its error type.

use async_trait::async_trait;

use visum_core::error::AppError;
use visum_entity::job::DispatchMessage;
use visum_entity::upload::ObjectLocation;

/// Performs the actual work for one job.
#[async_trait]
pub trait JobProcessor: Send + Sync + std::fmt::Debug {
    /// Process the artifact at `location`. The returned string is stored
    /// verbatim as the job's `summaryResult`.
    async fn process(
        &self,
        job: &DispatchMessage,
        location: &ObjectLocation,
    ) -> Result<String, ProcessingError>;
}

/// Error from job processing. Its display text becomes the job's
/// `errorMessage`.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// The job cannot be processed (bad input, upstream rejection).
    #[error("{0}")]
    Failed(String),

    /// Infrastructure error while processing.
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}
