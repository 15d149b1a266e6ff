//! Integration tests for status polling.

mod helpers;

use axum::http::StatusCode;

use visum_entity::job::fields;

#[tokio::test]
async fn test_poll_returns_flat_record() {
    let app = helpers::TestApp::new();
    let job_id = app.submit("uploads/abc_talk.mp4").await;

    let response = app.poll(&job_id).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.body.as_object().unwrap();
    for name in [
        fields::JOB_ID,
        fields::OBJECT_KEY,
        fields::STATUS,
        fields::ERROR_MESSAGE,
        fields::CREATED_AT,
        fields::SUMMARY_RESULT,
    ] {
        assert!(body[name].is_string(), "field {name} missing or not a string");
    }
    assert_eq!(body[fields::JOB_ID], job_id.as_str());
    assert_eq!(body[fields::OBJECT_KEY], "uploads/abc_talk.mp4");
    assert_eq!(body[fields::SUMMARY_RESULT], "");
}

#[tokio::test]
async fn test_poll_unknown_job_is_not_found() {
    let app = helpers::TestApp::new();

    let response = app.poll("00000000-0000-4000-8000-000000000000").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");

    let response = app.poll("not-a-uuid").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_poll_without_job_id_is_rejected() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/result", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("GET", "/api/result?jobId=", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_poll_reflects_worker_transitions() {
    let app = helpers::TestApp::new();
    let job_id = app.submit("uploads/abc.mp4").await;
    let id = job_id.parse().unwrap();

    app.state.orchestrator.mark_processing(&id).await.unwrap();
    assert_eq!(app.poll(&job_id).await.body["status"], "PROCESSING");

    app.state
        .orchestrator
        .fail(&id, "unsupported codec")
        .await
        .unwrap();
    let body = app.poll(&job_id).await.body;
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body[fields::ERROR_MESSAGE], "unsupported codec");
    assert_eq!(body[fields::OBJECT_KEY], "uploads/abc.mp4");
}

#[tokio::test]
async fn test_health_reports_components() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"]["provider"], "memory");
    assert_eq!(response.body["dispatch"]["status"], "up");

    app.channel.set_available(false);
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["dispatch"]["status"], "down");
}
