//! In-process dispatch channel with consumer-group semantics.
//!
//! Entries move from the ready queue to a pending list on delivery and
//! leave it on acknowledgement, mirroring a Redis Stream consumer group.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use visum_core::error::AppError;
use visum_core::result::AppResult;
use visum_core::traits::dispatch::{Delivery, DispatchChannel, DispatchConsumer};

/// Number of recent payloads kept for inspection.
const PUBLISHED_HISTORY: usize = 256;

#[derive(Debug, Default)]
struct Queues {
    ready: VecDeque<(String, String)>,
    /// Delivery id -> (consumer, payload).
    pending: BTreeMap<String, (String, String)>,
    /// The most recent accepted payloads, in publish order.
    published: VecDeque<String>,
}

/// In-process dispatch channel for tests and single-node development.
#[derive(Debug, Clone, Default)]
pub struct MemoryDispatchChannel {
    queues: Arc<Mutex<Queues>>,
    notify: Arc<Notify>,
    next_id: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryDispatchChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the broker going away (`false`) or coming back (`true`).
    /// While unavailable, `publish` fails with a dispatch-unavailable error.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// The last accepted payloads (at most 256), in publish order.
    pub fn published(&self) -> Vec<String> {
        self.lock().published.iter().cloned().collect()
    }

    /// Number of delivered but unacknowledged entries.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, Queues> {
        self.queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_ready(&self, consumer: &str, max: usize) -> Vec<Delivery> {
        let mut queues = self.lock();
        let mut deliveries = Vec::new();
        while deliveries.len() < max {
            let Some((id, payload)) = queues.ready.pop_front() else {
                break;
            };
            queues
                .pending
                .insert(id.clone(), (consumer.to_string(), payload.clone()));
            deliveries.push(Delivery {
                id,
                payload,
                redelivered: false,
            });
        }
        deliveries
    }
}

#[async_trait]
impl DispatchChannel for MemoryDispatchChannel {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn publish(&self, payload: &str) -> AppResult<String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::dispatch_unavailable("Dispatch channel is unavailable"));
        }
        let id = format!("{}-0", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        {
            let mut queues = self.lock();
            queues.ready.push_back((id.clone(), payload.to_string()));
            if queues.published.len() == PUBLISHED_HISTORY {
                queues.published.pop_front();
            }
            queues.published.push_back(payload.to_string());
        }
        self.notify.notify_waiters();
        Ok(id)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl DispatchConsumer for MemoryDispatchChannel {
    async fn receive(
        &self,
        consumer: &str,
        max: usize,
        block: Duration,
    ) -> AppResult<Vec<Delivery>> {
        let deadline = tokio::time::Instant::now() + block;
        loop {
            // Register interest before checking, so a publish in between is not missed.
            let notified = self.notify.notified();
            let deliveries = self.take_ready(consumer, max);
            if !deliveries.is_empty() {
                return Ok(deliveries);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }

    async fn claim_pending(&self, consumer: &str, max: usize) -> AppResult<Vec<Delivery>> {
        let queues = self.lock();
        Ok(queues
            .pending
            .iter()
            .filter(|(_, (owner, _))| owner == consumer)
            .take(max)
            .map(|(id, (_, payload))| Delivery {
                id: id.clone(),
                payload: payload.clone(),
                redelivered: true,
            })
            .collect())
    }

    async fn ack(&self, delivery_id: &str) -> AppResult<()> {
        self.lock().pending.remove(delivery_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use visum_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_publish_then_receive_and_ack() {
        let channel = MemoryDispatchChannel::new();
        channel.publish("{\"n\":1}").await.unwrap();
        channel.publish("{\"n\":2}").await.unwrap();

        let batch = channel
            .receive("w1", 10, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].payload, "{\"n\":1}");
        assert!(!batch[0].redelivered);
        assert_eq!(channel.pending_count(), 2);

        channel.ack(&batch[0].id).await.unwrap();
        channel.ack(&batch[1].id).await.unwrap();
        assert_eq!(channel.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_unacked_entries_are_reclaimed_by_their_consumer() {
        let channel = MemoryDispatchChannel::new();
        channel.publish("a").await.unwrap();
        let first = channel
            .receive("w1", 1, Duration::from_millis(10))
            .await
            .unwrap();

        assert!(channel.claim_pending("w2", 10).await.unwrap().is_empty());
        let reclaimed = channel.claim_pending("w1", 10).await.unwrap();
        assert_eq!(reclaimed.len(), 1);
        assert_eq!(reclaimed[0].id, first[0].id);
        assert!(reclaimed[0].redelivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_receive_wakes_on_publish() {
        let channel = MemoryDispatchChannel::new();
        let consumer = channel.clone();
        let waiter = tokio::spawn(async move {
            consumer
                .receive("w1", 1, Duration::from_secs(30))
                .await
                .unwrap()
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        channel.publish("late").await.unwrap();

        let batch = waiter.await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].payload, "late");
    }

    #[tokio::test(start_paused = true)]
    async fn test_receive_times_out_empty() {
        let channel = MemoryDispatchChannel::new();
        let batch = channel
            .receive("w1", 1, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_publish_history_is_bounded() {
        let channel = MemoryDispatchChannel::new();
        for i in 0..PUBLISHED_HISTORY + 10 {
            channel.publish(&i.to_string()).await.unwrap();
        }

        let published = channel.published();
        assert_eq!(published.len(), PUBLISHED_HISTORY);
        assert_eq!(published[0], "10");
        assert_eq!(
            published.last().map(String::as_str),
            Some((PUBLISHED_HISTORY + 9).to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_unavailable_channel_refuses_publish() {
        let channel = MemoryDispatchChannel::new();
        channel.set_available(false);

        let err = channel.publish("x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DispatchUnavailable);
        assert!(channel.published().is_empty());

        channel.set_available(true);
        channel.publish("x").await.unwrap();
        assert_eq!(channel.published(), vec!["x".to_string()]);
    }
}
