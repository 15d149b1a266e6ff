//! Shared test helpers for integration tests.
//!
//! Every test builds the full router over in-memory backends, so no
//! external services are needed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use visum_api::{AppState, build_app};
use visum_core::config::AppConfig;
use visum_core::result::AppResult;
use visum_core::traits::storage::PresignProvider;
use visum_core::traits::store::JobStore;
use visum_dispatch::memory::MemoryDispatchChannel;
use visum_service::UploadService;
use visum_store::memory::MemoryJobStore;

/// A presign call as seen by the fake presigner.
#[derive(Debug, Clone)]
pub struct PresignCall {
    pub key: String,
    pub metadata: HashMap<String, String>,
    pub expires_in: Duration,
}

/// Presigner that records calls and returns a deterministic URL.
#[derive(Debug, Default)]
pub struct FakePresigner {
    calls: Mutex<Vec<PresignCall>>,
}

impl FakePresigner {
    pub fn calls(&self) -> Vec<PresignCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PresignProvider for FakePresigner {
    fn provider_type(&self) -> &str {
        "fake"
    }

    fn bucket(&self) -> &str {
        "visum-test"
    }

    async fn presign_put(
        &self,
        key: &str,
        metadata: &HashMap<String, String>,
        expires_in: Duration,
    ) -> AppResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(PresignCall {
                key: key.to_string(),
                metadata: metadata.clone(),
                expires_in,
            });
        Ok(format!(
            "http://storage.test/visum-test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared application state, for driving services directly
    pub state: AppState,
    /// Backing job store
    pub store: MemoryJobStore,
    /// Backing dispatch channel
    pub channel: MemoryDispatchChannel,
    /// Presigner behind the upload service
    pub presigner: Arc<FakePresigner>,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let store = MemoryJobStore::new();
        Self::build(Arc::new(store.clone()), store)
    }

    /// Create a test application whose services use `job_store`.
    /// `self.store` is then a fresh, unused memory store.
    pub fn with_job_store(job_store: Arc<dyn JobStore>) -> Self {
        Self::build(job_store, MemoryJobStore::new())
    }

    fn build(job_store: Arc<dyn JobStore>, store: MemoryJobStore) -> Self {
        let config = AppConfig::default();
        let channel = MemoryDispatchChannel::new();
        let presigner = Arc::new(FakePresigner::default());

        let upload_service = UploadService::new(presigner.clone(), &config.storage);
        let cors = config.server.cors.clone();
        let state = AppState::new(
            config,
            job_store,
            Arc::new(channel.clone()),
            upload_service,
        );
        let router = build_app(state.clone(), &cors);

        Self {
            router,
            state,
            store,
            channel,
            presigner,
        }
    }

    /// Make an HTTP request to the test app with an optional JSON body.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body = match body {
            Some(b) => Body::from(serde_json::to_vec(&b).unwrap()),
            None => Body::empty(),
        };
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(body)
            .unwrap();
        self.send(req).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    /// Submit `object_key` and return the new job id.
    pub async fn submit(&self, object_key: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/send-summary-request",
                Some(serde_json::json!({ "object_key": object_key })),
            )
            .await;
        assert_eq!(response.status, StatusCode::ACCEPTED, "{:?}", response.body);
        response.body["job_id"].as_str().unwrap().to_string()
    }

    /// Poll `/api/result` for `job_id`.
    pub async fn poll(&self, job_id: &str) -> TestResponse {
        self.request("GET", &format!("/api/result?jobId={job_id}"), None)
            .await
    }
}

/// Parsed test response
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
