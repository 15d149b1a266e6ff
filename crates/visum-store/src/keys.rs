//! Store key builders.
//!
//! Workers read and write the same keys, so the layout is part of the
//! contract with them.

use visum_core::types::JobId;

/// Namespace of job records.
const JOB_NAMESPACE: &str = "job";

/// Key of the record for `job_id`: `job:<uuid>`.
pub fn job_key(job_id: &JobId) -> String {
    format!("{JOB_NAMESPACE}:{job_id}")
}

/// Key of the record for a caller-supplied id, which may not be a valid UUID.
pub fn job_key_raw(job_id: &str) -> String {
    format!("{JOB_NAMESPACE}:{job_id}")
}
