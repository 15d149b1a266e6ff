//! Integration tests for job submission.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;

use visum_core::error::AppError;
use visum_core::result::AppResult;
use visum_core::retry::RetryPolicy;
use visum_core::traits::store::{CasOutcome, JobStore, Record};
use visum_entity::job::{DispatchMessage, JobStatus};
use visum_store::JobStoreManager;

/// A job store that cannot be reached.
#[derive(Debug)]
struct UnreachableStore;

#[async_trait]
impl JobStore for UnreachableStore {
    fn provider_type(&self) -> &str {
        "unreachable"
    }

    async fn put(&self, _key: &str, _fields: &Record) -> AppResult<()> {
        Err(AppError::store_unavailable("Connection refused"))
    }

    async fn get(&self, _key: &str) -> AppResult<Record> {
        Err(AppError::store_unavailable("Connection refused"))
    }

    async fn compare_and_put(
        &self,
        _key: &str,
        _guard_field: &str,
        _expected: &[&str],
        _fields: &Record,
    ) -> AppResult<CasOutcome> {
        Err(AppError::store_unavailable("Connection refused"))
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::store_unavailable("Connection refused"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Err(AppError::store_unavailable("Connection refused"))
    }
}

#[tokio::test]
async fn test_submit_returns_accepted_pending_job() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/send-summary-request",
            Some(json!({ "object_key": "uploads/abc_lecture.mp4" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body["status"], "PENDING");
    assert!(response.body["message"].is_string());
    let job_id = response.body["job_id"].as_str().unwrap();
    assert_eq!(job_id.len(), 36);
}

#[tokio::test]
async fn test_submit_stores_record_before_dispatching() {
    let app = helpers::TestApp::new();
    let job_id = app.submit("uploads/abc_lecture.mp4").await;

    let published = app.channel.published();
    assert_eq!(published.len(), 1);
    let message = DispatchMessage::from_json(&published[0]).unwrap();
    assert_eq!(message.job_id.to_string(), job_id);
    assert_eq!(message.object_key, "uploads/abc_lecture.mp4");
    assert_eq!(message.status, JobStatus::Pending);

    let polled = app.poll(&job_id).await;
    assert_eq!(polled.status, StatusCode::OK);
    assert_eq!(polled.body["status"], "PENDING");
}

#[tokio::test]
async fn test_each_submission_gets_a_fresh_job() {
    let app = helpers::TestApp::new();
    let first = app.submit("uploads/same.mp4").await;
    let second = app.submit("uploads/same.mp4").await;

    assert_ne!(first, second);
    assert_eq!(app.store.len(), 2);
    assert_eq!(app.channel.published().len(), 2);
}

#[tokio::test]
async fn test_blank_object_key_is_rejected_without_side_effects() {
    let app = helpers::TestApp::new();

    for body in [json!({ "object_key": "   " }), json!({}), json!({ "object_key": "" })] {
        let response = app
            .request("POST", "/api/send-summary-request", Some(body))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], "VALIDATION_ERROR");
    }

    assert!(app.store.is_empty());
    assert!(app.channel.published().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = helpers::TestApp::new();
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/send-summary-request")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_dispatch_outage_reports_stored_job_id() {
    let app = helpers::TestApp::new();
    app.channel.set_available(false);

    let response = app
        .request(
            "POST",
            "/api/send-summary-request",
            Some(json!({ "object_key": "uploads/abc.mp4" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "DISPATCH_UNAVAILABLE");
    let job_id = response.body["details"]["job_id"].as_str().unwrap();

    // The record exists and stays PENDING; nothing was published.
    let polled = app.poll(job_id).await;
    assert_eq!(polled.status, StatusCode::OK);
    assert_eq!(polled.body["status"], "PENDING");
    assert!(app.channel.published().is_empty());
}

#[tokio::test]
async fn test_submit_by_file_query_parameter() {
    let app = helpers::TestApp::new();
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/send-summary-request?file=uploads%2Fabc_lecture.mp4")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    let job_id = response.body["job_id"].as_str().unwrap();
    assert_eq!(
        app.poll(job_id).await.body["objectKey"],
        "uploads/abc_lecture.mp4"
    );
}

#[tokio::test]
async fn test_blank_file_query_parameter_is_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request("POST", "/api/send-summary-request?file=%20", None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.channel.published().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_store_outage_is_503_and_nothing_is_dispatched() {
    let store = JobStoreManager::from_provider(
        Arc::new(UnreachableStore),
        Duration::from_millis(50),
        RetryPolicy::new(2, Duration::from_millis(100)),
    );
    let app = helpers::TestApp::with_job_store(Arc::new(store));

    let response = app
        .request(
            "POST",
            "/api/send-summary-request",
            Some(json!({ "object_key": "uploads/abc.mp4" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "STORE_UNAVAILABLE");
    assert!(response.body.get("details").is_none());
    assert!(app.channel.published().is_empty());
}
