//! Worker runner: main loop that reads deliveries and handles them.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};
use tokio::time::{self, MissedTickBehavior};

use visum_core::config::WorkerConfig;
use visum_core::traits::dispatch::{Delivery, DispatchConsumer};

use crate::handler::DeliveryHandler;

/// Pause after a failed read before trying again.
const READ_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// How long shutdown waits for in-flight jobs.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Upper bound on deliveries reclaimed per pass.
const RECLAIM_LIMIT: usize = 1_000;

/// Ids of deliveries currently being handled by this runner.
#[derive(Debug, Clone, Default)]
struct InFlight(Arc<Mutex<HashSet<String>>>);

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns `false` if `id` is already being handled.
    fn insert(&self, id: &str) -> bool {
        self.lock().insert(id.to_string())
    }

    fn remove(&self, id: &str) {
        self.lock().remove(id);
    }

    fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }
}

/// Main worker runner that consumes the dispatch channel as one member of
/// the consumer group.
///
/// Besides new deliveries, the runner periodically re-reads the ones it
/// holds unacknowledged (left over from a crash, or whose handling failed)
/// and handles them again. The first reclaim runs at startup.
#[derive(Debug)]
pub struct WorkerRunner {
    /// Consuming side of the dispatch channel.
    consumer: Arc<dyn DispatchConsumer>,
    /// Per-delivery logic.
    handler: Arc<DeliveryHandler>,
    /// Worker configuration.
    config: WorkerConfig,
    /// Consumer name within the group; stable across restarts so that
    /// deliveries left pending by a crash are recovered.
    worker_id: String,
    /// Deliveries with a running task.
    in_flight: InFlight,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(
        consumer: Arc<dyn DispatchConsumer>,
        handler: Arc<DeliveryHandler>,
        config: WorkerConfig,
        worker_id: impl Into<String>,
    ) -> Self {
        Self {
            consumer,
            handler,
            config,
            worker_id: worker_id.into(),
            in_flight: InFlight::default(),
        }
    }

    /// Run until the cancel signal is received, then wait for in-flight
    /// jobs to finish.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let concurrency = self.config.concurrency.max(1);
        tracing::info!(
            worker_id = %self.worker_id,
            concurrency,
            batch_size = self.config.batch_size,
            reclaim_interval_ms = self.config.reclaim_interval_ms,
            "Worker started"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut reclaim = time::interval(self.config.reclaim_interval());
        reclaim.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *cancel.borrow() {
                break;
            }

            let max = semaphore
                .available_permits()
                .clamp(1, self.config.batch_size.max(1));

            let result = tokio::select! {
                biased;
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!(worker_id = %self.worker_id, "Worker received shutdown signal");
                        break;
                    }
                    continue;
                }
                _ = reclaim.tick() => {
                    self.reclaim(&semaphore).await;
                    continue;
                }
                result = self.consumer.receive(&self.worker_id, max, self.config.block()) => result,
            };

            match result {
                Ok(deliveries) => {
                    for delivery in deliveries {
                        self.dispatch(&semaphore, delivery).await;
                    }
                }
                Err(e) => {
                    tracing::error!(worker_id = %self.worker_id, error = %e, "Failed to read from dispatch channel");
                    tokio::select! {
                        _ = cancel.changed() => {}
                        _ = time::sleep(READ_ERROR_BACKOFF) => {}
                    }
                }
            }
        }

        tracing::info!(worker_id = %self.worker_id, "Waiting for in-flight jobs to complete");
        let all = u32::try_from(concurrency).unwrap_or(u32::MAX);
        if time::timeout(SHUTDOWN_GRACE, semaphore.acquire_many(all))
            .await
            .is_err()
        {
            tracing::warn!(worker_id = %self.worker_id, "Shutdown grace elapsed with jobs still running");
        }
        tracing::info!(worker_id = %self.worker_id, "Worker shut down");
    }

    /// Re-read this consumer's unacknowledged deliveries and handle the
    /// ones no task is working on.
    async fn reclaim(&self, semaphore: &Arc<Semaphore>) {
        let pending = match self
            .consumer
            .claim_pending(&self.worker_id, RECLAIM_LIMIT)
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(worker_id = %self.worker_id, error = %e, "Failed to reclaim pending deliveries");
                return;
            }
        };

        let stale: Vec<Delivery> = pending
            .into_iter()
            .filter(|d| !self.in_flight.contains(&d.id))
            .collect();
        if stale.is_empty() {
            return;
        }

        tracing::info!(
            worker_id = %self.worker_id,
            count = stale.len(),
            "Retrying unacknowledged deliveries"
        );
        for delivery in stale {
            self.dispatch(semaphore, delivery).await;
        }
    }

    /// Wait for a free slot, then handle `delivery` on its own task.
    async fn dispatch(&self, semaphore: &Arc<Semaphore>, delivery: Delivery) {
        if !self.in_flight.insert(&delivery.id) {
            return;
        }
        let permit: OwnedSemaphorePermit = match Arc::clone(semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                self.in_flight.remove(&delivery.id);
                return;
            }
        };
        let handler = Arc::clone(&self.handler);
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let _permit = permit;
            match handler.handle(&delivery).await {
                Ok(outcome) => {
                    tracing::debug!(delivery_id = %delivery.id, ?outcome, "Delivery handled");
                }
                Err(e) => {
                    // Left unacknowledged; retried on the next reclaim.
                    tracing::error!(delivery_id = %delivery.id, error = %e, "Delivery handling failed");
                }
            }
            in_flight.remove(&delivery.id);
        });
    }
}
