//! Job store trait for pluggable key-value backends.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::result::AppResult;

/// A flat, string-keyed record as stored under one key.
///
/// Ordered so that serializing the same record twice is byte-identical.
pub type Record = BTreeMap<String, String>;

/// Outcome of a conditional merge ([`JobStore::compare_and_put`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// The guard matched and the fields were merged.
    Applied,
    /// The guard field held a value outside the expected set; nothing was written.
    Rejected {
        /// The value the guard field held at the time of the check.
        current: String,
    },
    /// No record exists at the key (or it lacks the guard field); nothing was written.
    Missing,
}

/// Trait for job store backends (Redis or in-memory).
///
/// Every call is atomic per key: the fields written by one `put` become
/// visible together, and a `get` never observes half of a `put`.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "redis", "memory").
    fn provider_type(&self) -> &str;

    /// Merge `fields` into the record at `key`, creating it if absent.
    async fn put(&self, key: &str, fields: &Record) -> AppResult<()>;

    /// Read the full record at `key`. Returns an empty record if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Record>;

    /// Merge `fields` into the record at `key` only if `guard_field`
    /// currently holds one of `expected`. Check and write happen atomically.
    async fn compare_and_put(
        &self,
        key: &str,
        guard_field: &str,
        expected: &[&str],
        fields: &Record,
    ) -> AppResult<CasOutcome>;

    /// Check whether a record exists at `key`.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
