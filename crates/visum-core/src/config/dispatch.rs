//! Dispatch channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level dispatch channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Channel provider type: `"redis"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Exchange the job requests are published to.
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// Routing key binding the exchange to the worker queue.
    #[serde(default = "default_routing_key")]
    pub routing_key: String,
    /// Queue name; workers consume as a group under this name.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Upper bound on a single publish, in milliseconds.
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_ms: u64,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisDispatchConfig,
}

impl DispatchConfig {
    /// Per-publish timeout.
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    /// Name of the stream the exchange/routing-key pair resolves to.
    pub fn stream_name(&self) -> String {
        format!("{}:{}", self.exchange, self.routing_key)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            exchange: default_exchange(),
            routing_key: default_routing_key(),
            queue: default_queue(),
            publish_timeout_ms: default_publish_timeout(),
            redis: RedisDispatchConfig::default(),
        }
    }
}

/// Redis Streams dispatch backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisDispatchConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Approximate cap on stream length (`MAXLEN ~`); zero disables trimming.
    #[serde(default = "default_max_len")]
    pub max_len: u64,
}

impl Default for RedisDispatchConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            max_len: default_max_len(),
        }
    }
}

fn default_provider() -> String {
    "redis".to_string()
}

fn default_exchange() -> String {
    "visum.exchange".to_string()
}

fn default_routing_key() -> String {
    "visum.transcription".to_string()
}

fn default_queue() -> String {
    "visum.transcription.queue".to_string()
}

fn default_publish_timeout() -> u64 {
    5_000
}

fn default_redis_url() -> String {
    "redis://localhost:6379/0".to_string()
}

fn default_max_len() -> u64 {
    100_000
}
