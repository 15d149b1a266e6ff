//! Processor that delegates to an HTTP summarizer service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use visum_core::config::WorkerConfig;
use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;
use visum_entity::job::DispatchMessage;
use visum_entity::upload::ObjectLocation;

use crate::processor::{JobProcessor, ProcessingError};

/// Longest slice of an error response body copied into `errorMessage`.
const MAX_ERROR_BODY: usize = 512;

/// Request body sent to the summarizer.
#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    job_id: String,
    object_key: &'a str,
    location: String,
}

/// POSTs each job to a summarizer endpoint and stores the response body as
/// the job result.
#[derive(Debug, Clone)]
pub struct HttpSummarizerProcessor {
    client: reqwest::Client,
    url: String,
}

impl HttpSummarizerProcessor {
    /// Create a processor for `url` with a per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create a processor from worker configuration.
    pub fn from_config(config: &WorkerConfig) -> AppResult<Self> {
        Self::new(config.summarizer_url.clone(), config.summarizer_timeout())
    }
}

#[async_trait]
impl JobProcessor for HttpSummarizerProcessor {
    async fn process(
        &self,
        job: &DispatchMessage,
        location: &ObjectLocation,
    ) -> Result<String, ProcessingError> {
        let body = SummarizeRequest {
            job_id: job.job_id.to_string(),
            object_key: &job.object_key,
            location: location.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProcessingError::Failed(format!("Summarizer request failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ProcessingError::Failed(format!("Failed to read summarizer response: {e}"))
        })?;

        if !status.is_success() {
            warn!(job_id = %job.job_id, status = status.as_u16(), "Summarizer rejected job");
            let excerpt: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(ProcessingError::Failed(format!(
                "Summarizer returned HTTP {}: {excerpt}",
                status.as_u16()
            )));
        }

        debug!(job_id = %job.job_id, bytes = text.len(), "Summarizer responded");
        Ok(text)
    }
}
