//! S3-compatible presign provider (AWS S3, MinIO).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use tracing::{debug, info};

use visum_core::config::StorageConfig;
use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;
use visum_core::traits::storage::PresignProvider;

/// Issues presigned `PUT` URLs against an S3-compatible bucket.
///
/// Presigning is a local signing operation; no request reaches the object
/// store until the client uploads.
#[derive(Debug, Clone)]
pub struct S3PresignProvider {
    client: Client,
    bucket: String,
}

impl S3PresignProvider {
    /// Build the provider from configuration.
    ///
    /// Static credentials are used when `access_key` is set; otherwise the
    /// default AWS credential chain applies.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::configuration("storage.bucket must not be empty"));
        }

        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 presign provider"
        );

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "visum-config",
            ));
        }
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(config.endpoint.clone());
        }
        let sdk_config = loader.load().await;

        let s3_config = S3ConfigBuilder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl PresignProvider for S3PresignProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn presign_put(
        &self,
        key: &str,
        metadata: &HashMap<String, String>,
        expires_in: Duration,
    ) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid presign expiry", e)
        })?;

        let mut request = self.client.put_object().bucket(&self.bucket).key(key);
        for (name, value) in metadata {
            request = request.metadata(name, value);
        }

        let presigned = request.presigned(presigning).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to presign upload: {e}"), e)
        })?;

        debug!(bucket = %self.bucket, key, "Issued presigned upload URL");
        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minio_config() -> StorageConfig {
        StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            bucket: "visum".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            ..StorageConfig::default()
        }
    }

    #[tokio::test]
    async fn test_presigned_url_is_scoped_and_expiring() {
        let provider = S3PresignProvider::new(&minio_config()).await.unwrap();

        let url = provider
            .presign_put(
                "uploads/1234_video.mp4",
                &HashMap::new(),
                Duration::from_secs(600),
            )
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/visum/uploads/1234_video.mp4?"));
        assert!(url.contains("X-Amz-Expires=600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_metadata_is_signed() {
        let provider = S3PresignProvider::new(&minio_config()).await.unwrap();
        let metadata = HashMap::from([("author".to_string(), "alice".to_string())]);

        let url = provider
            .presign_put("uploads/k", &metadata, Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.contains("x-amz-meta-author"));
    }

    #[tokio::test]
    async fn test_empty_bucket_is_rejected() {
        let config = StorageConfig {
            bucket: String::new(),
            ..minio_config()
        };
        let err = S3PresignProvider::new(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
