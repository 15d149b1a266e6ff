//! Message published to the dispatch channel for each accepted job.

use serde::{Deserialize, Serialize};

use visum_core::result::AppResult;
use visum_core::types::JobId;

use super::model::Job;
use super::status::JobStatus;

/// Queue payload: `{"job_id", "object_key", "status"}`.
///
/// The channel may deliver it more than once; consumers key their work on
/// `job_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchMessage {
    /// Job the message refers to.
    pub job_id: JobId,
    /// Storage key of the uploaded artifact.
    pub object_key: String,
    /// Status at the time of publishing.
    pub status: JobStatus,
}

impl DispatchMessage {
    /// Encode as the JSON wire payload.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON wire payload.
    pub fn from_json(payload: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

impl From<&Job> for DispatchMessage {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id,
            object_key: job.object_key.clone(),
            status: job.status,
        }
    }
}
