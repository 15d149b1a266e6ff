//! Integration tests for presigned upload URLs.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_presigned_url_is_scoped_to_a_fresh_key() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/get-presigned-url",
            Some(json!({ "keyName": "lecture.mp4" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let key = response.body["keyName"].as_str().unwrap();
    assert!(key.starts_with("uploads/"));
    assert!(key.ends_with("_lecture.mp4"));
    assert!(response.body["url"].as_str().unwrap().contains(key));

    let calls = app.presigner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].key, key);
    assert_eq!(calls[0].expires_in, Duration::from_secs(600));
    assert!(calls[0].metadata.is_empty());
}

#[tokio::test]
async fn test_repeated_names_get_distinct_keys() {
    let app = helpers::TestApp::new();
    let body = json!({ "keyName": "clip.mp4" });

    let first = app
        .request("POST", "/api/get-presigned-url", Some(body.clone()))
        .await;
    let second = app
        .request("POST", "/api/get-presigned-url", Some(body))
        .await;

    assert_ne!(first.body["keyName"], second.body["keyName"]);
}

#[tokio::test]
async fn test_metadata_is_forwarded_to_presigner() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/get-presigned-url",
            Some(json!({
                "keyName": "talk.mp4",
                "metaData": { "uploader": "alice", "lang": "en" }
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let calls = app.presigner.calls();
    assert_eq!(calls[0].metadata["uploader"], "alice");
    assert_eq!(calls[0].metadata["lang"], "en");
}

#[tokio::test]
async fn test_blank_key_name_is_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/get-presigned-url",
            Some(json!({ "keyName": "  " })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("POST", "/api/get-presigned-url", Some(json!({})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(app.presigner.calls().is_empty());
}

#[tokio::test]
async fn test_uploaded_key_can_be_submitted() {
    let app = helpers::TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/get-presigned-url",
            Some(json!({ "keyName": "lecture.mp4" })),
        )
        .await;
    let key = response.body["keyName"].as_str().unwrap().to_string();

    let job_id = app.submit(&key).await;

    assert_eq!(app.poll(&job_id).await.body["objectKey"], key.as_str());
    let location = app.state.upload_service.resolve(&key);
    assert_eq!(location.to_string(), format!("s3://visum-test/{key}"));
}
