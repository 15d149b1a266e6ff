//! Drives one delivery through the job's status transitions.

use std::sync::Arc;

use tracing::{error, info, warn};

use visum_core::error::ErrorKind;
use visum_core::result::AppResult;
use visum_core::traits::dispatch::{Delivery, DispatchConsumer};
use visum_entity::job::{DispatchMessage, JobStatus};
use visum_service::{JobOrchestrator, Transition};
use visum_storage::LocationResolver;

use crate::processor::JobProcessor;

/// What happened to a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The job was processed and reached `COMPLETED`.
    Completed,
    /// The job was processed and reached `FAILED`.
    Failed,
    /// The job was already terminal; the delivery was a duplicate.
    Skipped,
    /// The delivery carried nothing processable (bad payload, no record).
    Discarded,
}

/// Processes single deliveries. Every path that returns `Ok` acknowledges
/// the delivery; an `Err` leaves it pending for redelivery.
#[derive(Debug)]
pub struct DeliveryHandler {
    orchestrator: JobOrchestrator,
    consumer: Arc<dyn DispatchConsumer>,
    resolver: LocationResolver,
    processor: Arc<dyn JobProcessor>,
}

impl DeliveryHandler {
    /// Creates a new delivery handler.
    pub fn new(
        orchestrator: JobOrchestrator,
        consumer: Arc<dyn DispatchConsumer>,
        resolver: LocationResolver,
        processor: Arc<dyn JobProcessor>,
    ) -> Self {
        Self {
            orchestrator,
            consumer,
            resolver,
            processor,
        }
    }

    /// Handle one delivery end to end.
    pub async fn handle(&self, delivery: &Delivery) -> AppResult<HandleOutcome> {
        let message = match DispatchMessage::from_json(&delivery.payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(delivery_id = %delivery.id, error = %e, "Discarding undecodable dispatch message");
                self.consumer.ack(&delivery.id).await?;
                return Ok(HandleOutcome::Discarded);
            }
        };
        let job_id = message.job_id;

        match self.orchestrator.mark_processing(&job_id).await {
            Ok(Transition::Applied) => {}
            Ok(Transition::Ignored { current }) if current.is_terminal() => {
                info!(job_id = %job_id, status = %current, "Job already finished, skipping delivery");
                self.consumer.ack(&delivery.id).await?;
                return Ok(HandleOutcome::Skipped);
            }
            Ok(Transition::Ignored { current }) => {
                // PROCESSING: a previous attempt died before finishing.
                debug_assert_eq!(current, JobStatus::Processing);
                warn!(
                    job_id = %job_id,
                    redelivered = delivery.redelivered,
                    "Job was left in PROCESSING, processing again"
                );
            }
            Err(e) if e.kind == ErrorKind::NotFound => {
                warn!(job_id = %job_id, "No record for dispatched job, discarding delivery");
                self.consumer.ack(&delivery.id).await?;
                return Ok(HandleOutcome::Discarded);
            }
            Err(e) => return Err(e),
        }

        let location = self.resolver.resolve(&message.object_key);
        info!(job_id = %job_id, location = %location, "Processing job");

        let outcome = match self.processor.process(&message, &location).await {
            Ok(summary) => {
                self.orchestrator.complete(&job_id, &summary).await?;
                HandleOutcome::Completed
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Job processing failed");
                self.orchestrator.fail(&job_id, &e.to_string()).await?;
                HandleOutcome::Failed
            }
        };

        self.consumer.ack(&delivery.id).await?;
        Ok(outcome)
    }
}
