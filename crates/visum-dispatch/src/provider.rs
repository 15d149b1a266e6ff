//! Dispatch manager that selects and wraps the configured channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use visum_core::config::DispatchConfig;
use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;
use visum_core::retry::with_timeout;
use visum_core::traits::dispatch::{DispatchChannel, DispatchConsumer};

/// Dispatch manager wrapping the configured channel.
///
/// `publish` is bounded by the publish timeout and never retried here: a
/// failed publish is reported to the submitter, whose job record already
/// exists.
#[derive(Debug, Clone)]
pub struct DispatchManager {
    /// Publishing side.
    channel: Arc<dyn DispatchChannel>,
    /// Consuming side of the same channel.
    consumer: Arc<dyn DispatchConsumer>,
    /// Upper bound on one publish.
    publish_timeout: Duration,
}

impl DispatchManager {
    /// Create a new dispatch manager from configuration.
    pub async fn new(config: &DispatchConfig) -> AppResult<Self> {
        let (channel, consumer): (Arc<dyn DispatchChannel>, Arc<dyn DispatchConsumer>) =
            match config.provider.as_str() {
                #[cfg(feature = "redis-backend")]
                "redis" => {
                    info!(stream = %config.stream_name(), "Initializing Redis Streams dispatch channel");
                    split(crate::redis::RedisStreamChannel::connect(config).await?)
                }
                #[cfg(feature = "memory")]
                "memory" => {
                    info!("Initializing in-memory dispatch channel");
                    split(crate::memory::MemoryDispatchChannel::new())
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown dispatch provider: '{other}'. Supported: memory, redis"
                    )));
                }
            };

        Ok(Self {
            channel,
            consumer,
            publish_timeout: config.publish_timeout(),
        })
    }

    /// Create a manager from existing providers (for testing).
    pub fn from_provider(
        channel: Arc<dyn DispatchChannel>,
        consumer: Arc<dyn DispatchConsumer>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            channel,
            consumer,
            publish_timeout,
        }
    }

    /// Consuming side, for workers.
    pub fn consumer(&self) -> Arc<dyn DispatchConsumer> {
        Arc::clone(&self.consumer)
    }
}

/// Share one channel as both its publishing and consuming sides.
fn split<C>(channel: C) -> (Arc<dyn DispatchChannel>, Arc<dyn DispatchConsumer>)
where
    C: DispatchChannel + DispatchConsumer,
{
    let channel = Arc::new(channel);
    let consumer: Arc<dyn DispatchConsumer> = channel.clone();
    let publisher: Arc<dyn DispatchChannel> = channel;
    (publisher, consumer)
}

#[async_trait]
impl DispatchChannel for DispatchManager {
    fn provider_type(&self) -> &str {
        self.channel.provider_type()
    }

    async fn publish(&self, payload: &str) -> AppResult<String> {
        with_timeout(
            self.publish_timeout,
            ErrorKind::DispatchUnavailable,
            "dispatch publish",
            self.channel.publish(payload),
        )
        .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        with_timeout(
            self.publish_timeout,
            ErrorKind::DispatchUnavailable,
            "dispatch health check",
            self.channel.health_check(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDispatchChannel;

    #[derive(Debug)]
    struct HangingChannel;

    #[async_trait]
    impl DispatchChannel for HangingChannel {
        fn provider_type(&self) -> &str {
            "hanging"
        }

        async fn publish(&self, _payload: &str) -> AppResult<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".to_string())
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_timeout_is_dispatch_unavailable() {
        let manager = DispatchManager::from_provider(
            Arc::new(HangingChannel),
            Arc::new(MemoryDispatchChannel::new()),
            Duration::from_secs(5),
        );

        let err = manager.publish("{}").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DispatchUnavailable);
    }

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let config = DispatchConfig {
            provider: "memory".to_string(),
            ..DispatchConfig::default()
        };
        let manager = DispatchManager::new(&config).await.unwrap();
        assert_eq!(manager.provider_type(), "memory");

        manager.publish("{\"job_id\":\"1\"}").await.unwrap();
        let batch = manager
            .consumer()
            .receive("w1", 10, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let config = DispatchConfig {
            provider: "amqp".to_string(),
            ..DispatchConfig::default()
        };
        let err = DispatchManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
