//! Job orchestration: submission and status transitions.
//!
//! Submission writes the full `PENDING` record first and publishes the
//! dispatch message second, so a worker can never receive a job whose
//! record does not exist yet. Later transitions are conditional merges on
//! the `status` field and only ever move forward.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;
use visum_core::traits::dispatch::DispatchChannel;
use visum_core::traits::store::{CasOutcome, JobStore, Record};
use visum_core::types::JobId;
use visum_entity::job::{DispatchMessage, Job, JobStatus, fields};
use visum_store::keys::job_key;

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Identifier of the new job.
    pub job_id: JobId,
    /// Status at acceptance, always `PENDING`.
    pub status: JobStatus,
}

/// Outcome of a status transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The job moved to the requested status.
    Applied,
    /// The requested status is not a forward edge from `current`; nothing
    /// was written. Duplicate and out-of-order signals end up here.
    Ignored {
        /// Status the job held when the signal arrived.
        current: JobStatus,
    },
}

/// Creates jobs, dispatches them, and applies completion signals.
#[derive(Debug, Clone)]
pub struct JobOrchestrator {
    /// Job record store.
    store: Arc<dyn JobStore>,
    /// Publishing side of the dispatch channel.
    dispatch: Arc<dyn DispatchChannel>,
}

impl JobOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(store: Arc<dyn JobStore>, dispatch: Arc<dyn DispatchChannel>) -> Self {
        Self { store, dispatch }
    }

    /// Accepts an uploaded object for processing.
    ///
    /// Fails with `Validation` on a blank key (nothing is written), with
    /// the store's error if the record cannot be written (nothing is
    /// published), and with `DispatchUnavailable` if the record was written
    /// but the message could not be published. In the last case the error
    /// details carry the `job_id` of the stranded `PENDING` record.
    pub async fn submit(&self, object_key: &str) -> AppResult<SubmitReceipt> {
        if object_key.trim().is_empty() {
            return Err(AppError::validation("object_key must not be empty"));
        }

        let job = Job::new(object_key);
        let key = job_key(&job.job_id);
        let payload = DispatchMessage::from(&job).to_json()?;

        self.store.put(&key, &job.to_record()).await?;
        debug!(job_id = %job.job_id, "Job record stored");

        match self.dispatch.publish(&payload).await {
            Ok(message_id) => {
                info!(
                    job_id = %job.job_id,
                    object_key = %job.object_key,
                    message_id = %message_id,
                    "Job submitted"
                );
                Ok(SubmitReceipt {
                    job_id: job.job_id,
                    status: job.status,
                })
            }
            Err(e) => {
                error!(
                    job_id = %job.job_id,
                    object_key = %job.object_key,
                    error = %e,
                    "Job stored but dispatch failed"
                );
                Err(AppError::with_source(
                    ErrorKind::DispatchUnavailable,
                    format!("Job {} was stored but could not be dispatched", job.job_id),
                    e,
                )
                .with_details(json!({
                    "job_id": job.job_id.to_string(),
                    "status": job.status.as_str(),
                })))
            }
        }
    }

    /// `PENDING -> PROCESSING`, signalled when a worker picks the job up.
    pub async fn mark_processing(&self, job_id: &JobId) -> AppResult<Transition> {
        self.transition(job_id, JobStatus::Processing, Record::new())
            .await
    }

    /// `PENDING | PROCESSING -> COMPLETED` with the processing output.
    pub async fn complete(&self, job_id: &JobId, summary_result: &str) -> AppResult<Transition> {
        let update = Record::from([
            (fields::SUMMARY_RESULT.to_string(), summary_result.to_string()),
            (fields::ERROR_MESSAGE.to_string(), String::new()),
        ]);
        self.transition(job_id, JobStatus::Completed, update).await
    }

    /// `PENDING | PROCESSING -> FAILED` with a failure description.
    pub async fn fail(&self, job_id: &JobId, error_message: &str) -> AppResult<Transition> {
        let update = Record::from([
            (fields::ERROR_MESSAGE.to_string(), error_message.to_string()),
            (fields::SUMMARY_RESULT.to_string(), String::new()),
        ]);
        self.transition(job_id, JobStatus::Failed, update).await
    }

    async fn transition(
        &self,
        job_id: &JobId,
        target: JobStatus,
        mut update: Record,
    ) -> AppResult<Transition> {
        let key = job_key(job_id);
        let expected: Vec<&str> = target.predecessors().iter().map(|s| s.as_str()).collect();
        update.insert(fields::STATUS.to_string(), target.as_str().to_string());

        match self
            .store
            .compare_and_put(&key, fields::STATUS, &expected, &update)
            .await?
        {
            CasOutcome::Applied => {
                info!(job_id = %job_id, status = %target, "Job status updated");
                Ok(Transition::Applied)
            }
            CasOutcome::Rejected { current } => {
                let current = current.parse::<JobStatus>().map_err(|e| {
                    AppError::store(format!("Job {job_id} holds an invalid status: {e}"))
                })?;
                warn!(
                    job_id = %job_id,
                    current = %current,
                    requested = %target,
                    "Ignoring status transition"
                );
                Ok(Transition::Ignored { current })
            }
            CasOutcome::Missing => Err(AppError::not_found(format!("Job {job_id} not found"))),
        }
    }
}
