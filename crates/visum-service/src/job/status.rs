//! Point-in-time job status reads for polling clients.

use std::sync::Arc;

use tracing::debug;

use visum_core::error::AppError;
use visum_core::result::AppResult;
use visum_core::traits::store::{JobStore, Record};
use visum_core::types::JobId;
use visum_entity::job::Job;
use visum_store::keys::{job_key, job_key_raw};

/// Serves job records to polling clients. Reads never block on writers.
#[derive(Debug, Clone)]
pub struct StatusReader {
    /// Job record store.
    store: Arc<dyn JobStore>,
}

impl StatusReader {
    /// Creates a new status reader.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Returns the stored record for `job_id` as a flat string mapping.
    ///
    /// The id is used verbatim, so any string that was never issued
    /// (including one that is not a UUID) reads as `NotFound`.
    pub async fn get_result(&self, job_id: &str) -> AppResult<Record> {
        if job_id.is_empty() {
            return Err(AppError::validation("jobId must not be empty"));
        }

        let record = self.store.get(&job_key_raw(job_id)).await?;
        if record.is_empty() {
            debug!(job_id, "Polled unknown job");
            return Err(AppError::not_found(format!("Job {job_id} not found")));
        }
        Ok(record)
    }

    /// Returns the typed job for `job_id`.
    pub async fn get_job(&self, job_id: &JobId) -> AppResult<Job> {
        let record = self.store.get(&job_key(job_id)).await?;
        if record.is_empty() {
            return Err(AppError::not_found(format!("Job {job_id} not found")));
        }
        Job::from_record(&record)
    }
}
