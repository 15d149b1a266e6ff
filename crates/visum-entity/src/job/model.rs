//! Job entity model and its flat store representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;
use visum_core::traits::store::Record;
use visum_core::types::JobId;

use super::status::JobStatus;

/// Field names of the stored job record. Workers write to the same names.
pub mod fields {
    /// Job identifier.
    pub const JOB_ID: &str = "jobId";
    /// Object key of the uploaded artifact.
    pub const OBJECT_KEY: &str = "objectKey";
    /// Current status.
    pub const STATUS: &str = "status";
    /// Failure description, empty unless `FAILED`.
    pub const ERROR_MESSAGE: &str = "errorMessage";
    /// Creation time in epoch milliseconds.
    pub const CREATED_AT: &str = "createdAt";
    /// Processing output, empty unless `COMPLETED`.
    pub const SUMMARY_RESULT: &str = "summaryResult";
}

/// A media processing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub job_id: JobId,
    /// Storage key of the uploaded artifact.
    pub object_key: String,
    /// Current job status.
    pub status: JobStatus,
    /// Error message on failure.
    pub error_message: Option<String>,
    /// Summary produced on completion.
    pub summary_result: Option<String>,
    /// When the job was created (millisecond precision).
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a fresh `PENDING` job for an uploaded object.
    pub fn new(object_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id: JobId::new(),
            object_key: object_key.into(),
            status: JobStatus::Pending,
            error_message: None,
            summary_result: None,
            created_at: DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now),
        }
    }

    /// Check whether the job reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Full record with every field set; absent values are stored as "".
    pub fn to_record(&self) -> Record {
        Record::from([
            (fields::JOB_ID.to_string(), self.job_id.to_string()),
            (fields::OBJECT_KEY.to_string(), self.object_key.clone()),
            (fields::STATUS.to_string(), self.status.as_str().to_string()),
            (
                fields::ERROR_MESSAGE.to_string(),
                self.error_message.clone().unwrap_or_default(),
            ),
            (
                fields::CREATED_AT.to_string(),
                self.created_at.timestamp_millis().to_string(),
            ),
            (
                fields::SUMMARY_RESULT.to_string(),
                self.summary_result.clone().unwrap_or_default(),
            ),
        ])
    }

    /// Rebuild a job from a stored record.
    pub fn from_record(record: &Record) -> AppResult<Self> {
        let required = |name: &str| {
            record
                .get(name)
                .ok_or_else(|| AppError::store(format!("Job record is missing field '{name}'")))
        };
        let optional = |name: &str| record.get(name).filter(|v| !v.is_empty()).cloned();

        let job_id = required(fields::JOB_ID)?
            .parse::<JobId>()
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Invalid jobId", e))?;
        let status = required(fields::STATUS)?
            .parse::<JobStatus>()
            .map_err(AppError::store)?;
        let created_millis = required(fields::CREATED_AT)?
            .parse::<i64>()
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Invalid createdAt", e))?;
        let created_at = DateTime::from_timestamp_millis(created_millis)
            .ok_or_else(|| AppError::store(format!("createdAt out of range: {created_millis}")))?;

        Ok(Self {
            job_id,
            object_key: required(fields::OBJECT_KEY)?.clone(),
            status,
            error_message: optional(fields::ERROR_MESSAGE),
            summary_result: optional(fields::SUMMARY_RESULT),
            created_at,
        })
    }
}
