//! End-to-end job lifecycle: submit over HTTP, process with a worker,
//! poll the result.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::sync::watch;

use visum_core::config::WorkerConfig;
use visum_core::traits::dispatch::DispatchConsumer;
use visum_entity::job::DispatchMessage;
use visum_entity::upload::ObjectLocation;
use visum_storage::LocationResolver;
use visum_worker::{DeliveryHandler, JobProcessor, ProcessingError, WorkerRunner};

/// Summarizes every object except those whose key contains "corrupt".
#[derive(Debug, Default)]
struct StubSummarizer {
    calls: AtomicU32,
}

#[async_trait]
impl JobProcessor for StubSummarizer {
    async fn process(
        &self,
        job: &DispatchMessage,
        location: &ObjectLocation,
    ) -> Result<String, ProcessingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if job.object_key.contains("corrupt") {
            return Err(ProcessingError::Failed("could not decode media".to_string()));
        }
        Ok(format!("{{\"summary\":\"{}\"}}", location.key))
    }
}

fn start_worker(
    app: &helpers::TestApp,
    processor: Arc<StubSummarizer>,
) -> (watch::Sender<bool>, tokio::task::JoinHandle<()>) {
    let consumer: Arc<dyn DispatchConsumer> = Arc::new(app.channel.clone());
    let handler = DeliveryHandler::new(
        (*app.state.orchestrator).clone(),
        Arc::clone(&consumer),
        LocationResolver::new("visum-test"),
        processor,
    );
    let config = WorkerConfig {
        block_ms: 20,
        ..WorkerConfig::default()
    };
    let runner = WorkerRunner::new(consumer, Arc::new(handler), config, "it-worker");
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(async move { runner.run(rx).await });
    (tx, task)
}

async fn poll_until_terminal(app: &helpers::TestApp, job_id: &str) -> serde_json::Value {
    for _ in 0..300 {
        let response = app.poll(job_id).await;
        assert_eq!(response.status, StatusCode::OK);
        let status = response.body["status"].as_str().unwrap_or_default().to_string();
        if status == "COMPLETED" || status == "FAILED" {
            return response.body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never finished");
}

#[tokio::test]
async fn test_submitted_jobs_reach_terminal_status() {
    let app = helpers::TestApp::new();
    let processor = Arc::new(StubSummarizer::default());
    let (shutdown, worker) = start_worker(&app, processor.clone());

    let ok = app.submit("uploads/abc_lecture.mp4").await;
    let bad = app.submit("uploads/def_corrupt.mp4").await;

    let ok_body = poll_until_terminal(&app, &ok).await;
    assert_eq!(ok_body["status"], "COMPLETED");
    assert_eq!(
        ok_body["summaryResult"],
        "{\"summary\":\"uploads/abc_lecture.mp4\"}"
    );
    assert_eq!(ok_body["errorMessage"], "");
    assert_eq!(ok_body["objectKey"], "uploads/abc_lecture.mp4");

    let bad_body = poll_until_terminal(&app, &bad).await;
    assert_eq!(bad_body["status"], "FAILED");
    assert_eq!(bad_body["errorMessage"], "could not decode media");
    assert_eq!(bad_body["summaryResult"], "");

    shutdown.send(true).unwrap();
    worker.await.unwrap();

    assert_eq!(processor.calls.load(Ordering::SeqCst), 2);
    assert_eq!(app.channel.pending_count(), 0);
}

#[tokio::test]
async fn test_late_signals_do_not_regress_finished_jobs() {
    let app = helpers::TestApp::new();
    let processor = Arc::new(StubSummarizer::default());
    let (shutdown, worker) = start_worker(&app, processor);

    let job_id = app.submit("uploads/abc.mp4").await;
    poll_until_terminal(&app, &job_id).await;
    shutdown.send(true).unwrap();
    worker.await.unwrap();

    let id = job_id.parse().unwrap();
    app.state.orchestrator.mark_processing(&id).await.unwrap();
    app.state.orchestrator.fail(&id, "late").await.unwrap();

    let body = app.poll(&job_id).await.body;
    assert_eq!(body["status"], "COMPLETED");
    assert_eq!(body["errorMessage"], "");
}
