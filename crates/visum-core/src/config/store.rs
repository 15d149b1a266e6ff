//! Job store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Top-level job store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider type: `"redis"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Upper bound on a single store call, in milliseconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
    /// Total attempts for a store call that fails on connectivity.
    #[serde(default = "default_retry_attempts")]
    pub retry_max_attempts: u32,
    /// Fixed delay between retry attempts, in milliseconds.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisStoreConfig,
}

impl StoreConfig {
    /// Per-call timeout.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Retry policy applied to connectivity failures.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            operation_timeout_ms: default_operation_timeout(),
            retry_max_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            redis: RedisStoreConfig::default(),
        }
    }
}

/// Redis job store backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL (database index selects the job keyspace).
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prefix prepended to every key. Empty by default so records live at
    /// the `job:<id>` keys that workers write to.
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: String::new(),
        }
    }
}

fn default_provider() -> String {
    "redis".to_string()
}

fn default_operation_timeout() -> u64 {
    2_000
}

fn default_retry_attempts() -> u32 {
    5
}

fn default_retry_backoff() -> u64 {
    3_000
}

fn default_redis_url() -> String {
    "redis://localhost:6379/2".to_string()
}
