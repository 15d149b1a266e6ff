//! Object-storage presigning collaborator.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Issues direct-upload URLs against object storage.
///
/// Implemented in `visum-storage` for S3-compatible stores.
#[async_trait]
pub trait PresignProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3").
    fn provider_type(&self) -> &str;

    /// Bucket the issued URLs write into.
    fn bucket(&self) -> &str;

    /// Issue a `PUT` URL scoped to exactly `key`, valid for `expires_in`.
    async fn presign_put(
        &self,
        key: &str,
        metadata: &HashMap<String, String>,
        expires_in: Duration,
    ) -> AppResult<String>;
}
