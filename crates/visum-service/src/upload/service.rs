//! Upload service: issues direct-upload URLs and resolves uploaded keys.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use visum_core::config::StorageConfig;
use visum_core::result::AppResult;
use visum_core::traits::storage::PresignProvider;
use visum_entity::upload::{ObjectLocation, PresignedUrlRequest, PresignedUrlResponse};
use visum_storage::{LocationResolver, upload_key};

/// Issues presigned upload URLs scoped to fresh, unique object keys.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Object storage presigner.
    presign: Arc<dyn PresignProvider>,
    /// Maps object keys to bucket locations.
    resolver: LocationResolver,
    /// Prefix for generated keys.
    upload_prefix: String,
    /// Lifetime of issued URLs.
    expiry: Duration,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(presign: Arc<dyn PresignProvider>, config: &StorageConfig) -> Self {
        let resolver = LocationResolver::new(presign.bucket());
        Self {
            presign,
            resolver,
            upload_prefix: config.upload_prefix.clone(),
            expiry: config.presign_expiry(),
        }
    }

    /// Issues a `PUT` URL for a new object named after `request.key_name`.
    ///
    /// The returned `key_name` is the full generated object key; clients
    /// submit it as the job's `object_key` once the upload finished.
    pub async fn create_presigned_url(
        &self,
        request: &PresignedUrlRequest,
    ) -> AppResult<PresignedUrlResponse> {
        let key = upload_key(&self.upload_prefix, &request.key_name)?;
        let metadata = request.meta_data.clone().unwrap_or_else(HashMap::new);

        let url = self.presign.presign_put(&key, &metadata, self.expiry).await?;

        info!(
            key = %key,
            expires_in_secs = self.expiry.as_secs(),
            "Issued presigned upload URL"
        );
        Ok(PresignedUrlResponse { key_name: key, url })
    }

    /// Canonical location the worker fetches `object_key` from.
    pub fn resolve(&self, object_key: &str) -> ObjectLocation {
        self.resolver.resolve(object_key)
    }
}
