//! Job store manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use visum_core::config::StoreConfig;
use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;
use visum_core::retry::{RetryPolicy, retry, with_timeout};
use visum_core::traits::store::{CasOutcome, JobStore, Record};

/// Job store manager that wraps the configured provider.
///
/// Every call is bounded by the operation timeout; calls that fail with
/// [`ErrorKind::StoreUnavailable`] (refused, dropped, or timed out) are
/// retried according to the retry policy. Other errors surface at once.
#[derive(Debug, Clone)]
pub struct JobStoreManager {
    /// The inner store provider.
    inner: Arc<dyn JobStore>,
    /// Upper bound on one attempt.
    timeout: Duration,
    /// Retry policy for connectivity failures.
    policy: RetryPolicy,
}

impl JobStoreManager {
    /// Create a new job store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn JobStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis job store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisJobStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory job store");
                Arc::new(crate::memory::MemoryJobStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self {
            inner,
            timeout: config.operation_timeout(),
            policy: config.retry_policy(),
        })
    }

    /// Create a manager from an existing provider (for testing).
    pub fn from_provider(
        provider: Arc<dyn JobStore>,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            inner: provider,
            timeout,
            policy,
        }
    }

    async fn call<T, F, Fut>(&self, operation: &str, op: F) -> AppResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AppResult<T>>,
    {
        retry(&self.policy, operation, is_retryable, || {
            with_timeout(self.timeout, ErrorKind::StoreUnavailable, operation, op())
        })
        .await
    }
}

fn is_retryable(e: &AppError) -> bool {
    e.kind == ErrorKind::StoreUnavailable
}

#[async_trait]
impl JobStore for JobStoreManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn put(&self, key: &str, fields: &Record) -> AppResult<()> {
        self.call("store put", || self.inner.put(key, fields)).await
    }

    async fn get(&self, key: &str) -> AppResult<Record> {
        self.call("store get", || self.inner.get(key)).await
    }

    async fn compare_and_put(
        &self,
        key: &str,
        guard_field: &str,
        expected: &[&str],
        fields: &Record,
    ) -> AppResult<CasOutcome> {
        self.call("store compare_and_put", || {
            self.inner.compare_and_put(key, guard_field, expected, fields)
        })
        .await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.call("store exists", || self.inner.exists(key)).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        with_timeout(
            self.timeout,
            ErrorKind::StoreUnavailable,
            "store health check",
            self.inner.health_check(),
        )
        .await
    }
}
