//! Dispatch channel traits: the publishing side used on submission and the
//! consuming side used by workers.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// One message handed to a consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Channel-assigned delivery identifier, used to acknowledge.
    pub id: String,
    /// Raw message payload (JSON).
    pub payload: String,
    /// Whether this message was handed out before and never acknowledged.
    pub redelivered: bool,
}

/// Publishing side of a durable, at-least-once message channel.
///
/// The exchange and routing key are fixed when the channel is constructed;
/// `publish` returns once the channel has durably accepted the payload.
#[async_trait]
pub trait DispatchChannel: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "redis", "memory").
    fn provider_type(&self) -> &str;

    /// Publish a payload. Returns the channel-assigned message id.
    async fn publish(&self, payload: &str) -> AppResult<String>;

    /// Check that the channel backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Consuming side of the channel, used by workers in a consumer group.
///
/// A delivery stays pending until acknowledged; unacknowledged deliveries
/// are handed out again, so handlers must be idempotent.
#[async_trait]
pub trait DispatchConsumer: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch up to `max` new deliveries for `consumer`, waiting at most
    /// `block` when none are ready.
    async fn receive(&self, consumer: &str, max: usize, block: Duration)
    -> AppResult<Vec<Delivery>>;

    /// Fetch up to `max` deliveries that were handed to `consumer` earlier
    /// and never acknowledged, e.g. because it crashed mid-job. Called once
    /// on startup, before the first `receive`.
    async fn claim_pending(&self, consumer: &str, max: usize) -> AppResult<Vec<Delivery>>;

    /// Acknowledge a delivery so it is not handed out again.
    async fn ack(&self, delivery_id: &str) -> AppResult<()>;
}
