//! Worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Dispatch consumer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Consumer name within the group. Keep it stable across restarts so a
    /// restarted worker recovers its unacknowledged deliveries. Empty uses
    /// the `HOSTNAME` environment variable, or a random name.
    #[serde(default)]
    pub consumer_name: String,
    /// Number of jobs processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Maximum deliveries fetched per read.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// How long a read blocks waiting for new deliveries, in milliseconds.
    #[serde(default = "default_block")]
    pub block_ms: u64,
    /// How often the worker re-reads its own unacknowledged deliveries, in
    /// milliseconds. Deliveries whose handling failed are retried then.
    #[serde(default = "default_reclaim_interval")]
    pub reclaim_interval_ms: u64,
    /// Summarizer endpoint the default processor posts jobs to.
    #[serde(default = "default_summarizer_url")]
    pub summarizer_url: String,
    /// Timeout for one summarizer call, in seconds.
    #[serde(default = "default_summarizer_timeout")]
    pub summarizer_timeout_seconds: u64,
}

impl WorkerConfig {
    /// Read block duration.
    pub fn block(&self) -> Duration {
        Duration::from_millis(self.block_ms)
    }

    /// Interval between reclaims of unacknowledged deliveries.
    pub fn reclaim_interval(&self) -> Duration {
        Duration::from_millis(self.reclaim_interval_ms.max(1))
    }

    /// Summarizer call timeout.
    pub fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.summarizer_timeout_seconds)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            consumer_name: String::new(),
            concurrency: default_concurrency(),
            batch_size: default_batch_size(),
            block_ms: default_block(),
            reclaim_interval_ms: default_reclaim_interval(),
            summarizer_url: default_summarizer_url(),
            summarizer_timeout_seconds: default_summarizer_timeout(),
        }
    }
}

fn default_concurrency() -> usize {
    2
}

fn default_batch_size() -> usize {
    10
}

fn default_block() -> u64 {
    5_000
}

fn default_reclaim_interval() -> u64 {
    30_000
}

fn default_summarizer_url() -> String {
    "http://localhost:8000/summarize".to_string()
}

fn default_summarizer_timeout() -> u64 {
    900
}
