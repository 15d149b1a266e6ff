//! Request DTOs.

use serde::Deserialize;

/// Body of `POST /api/send-summary-request`.
///
/// `object_key` is optional at the wire level so that a missing key is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryRequest {
    /// Key of the uploaded object to summarize.
    #[serde(default)]
    pub object_key: Option<String>,
}

/// Query of `POST /api/send-summary-request`.
///
/// Browser clients pass the uploaded key as `?file=<keyName>` with no body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    /// Key of the uploaded object to summarize.
    #[serde(default)]
    pub file: Option<String>,
}

/// Query of `GET /api/result`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultQuery {
    /// Job to look up.
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
}
