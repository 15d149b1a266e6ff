//! In-memory job store using dashmap.
//!
//! Per-key atomicity comes from the shard lock held by a dashmap entry
//! guard for the duration of each call.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use visum_core::result::AppResult;
use visum_core::traits::store::{CasOutcome, JobStore, Record};

/// In-process job store for tests and single-node development.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    records: Arc<DashMap<String, Record>>,
}

impl MemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn put(&self, key: &str, fields: &Record) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut entry = self.records.entry(key.to_string()).or_default();
        entry.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Record> {
        Ok(self
            .records
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn compare_and_put(
        &self,
        key: &str,
        guard_field: &str,
        expected: &[&str],
        fields: &Record,
    ) -> AppResult<CasOutcome> {
        let Some(mut entry) = self.records.get_mut(key) else {
            return Ok(CasOutcome::Missing);
        };
        let Some(current) = entry.get(guard_field).cloned() else {
            return Ok(CasOutcome::Missing);
        };
        if !expected.contains(&current.as_str()) {
            return Ok(CasOutcome::Rejected { current });
        }
        entry.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(CasOutcome::Applied)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.records.contains_key(key))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
