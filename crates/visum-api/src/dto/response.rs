//! Response DTOs.

use serde::{Deserialize, Serialize};

use visum_entity::job::JobStatus;

/// Body of an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryAccepted {
    /// Human-readable acknowledgement.
    pub message: String,
    /// Identifier to poll with.
    pub job_id: String,
    /// Status at acceptance.
    pub status: JobStatus,
}

/// Health of one backend component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Provider name (e.g., "redis", "memory").
    pub provider: String,
    /// "up" or "down".
    pub status: String,
    /// Error text when the check failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" when every component is up, "degraded" otherwise.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Job store health.
    pub store: ComponentHealth,
    /// Dispatch channel health.
    pub dispatch: ComponentHealth,
}
