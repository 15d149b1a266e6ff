//! Object storage (presigned upload) configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO). Empty uses AWS defaults.
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket uploads land in.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Use path-style addressing (required by MinIO).
    #[serde(default = "default_true")]
    pub force_path_style: bool,
    /// Lifetime of an issued upload URL in seconds.
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_seconds: u64,
    /// Key prefix for uploaded objects.
    #[serde(default = "default_upload_prefix")]
    pub upload_prefix: String,
}

impl StorageConfig {
    /// Lifetime of an issued upload URL.
    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_seconds)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            bucket: default_bucket(),
            access_key: String::new(),
            secret_key: String::new(),
            force_path_style: true,
            presign_expiry_seconds: default_presign_expiry(),
            upload_prefix: default_upload_prefix(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket() -> String {
    "visum".to_string()
}

fn default_true() -> bool {
    true
}

fn default_presign_expiry() -> u64 {
    600 // 10 minutes
}

fn default_upload_prefix() -> String {
    "uploads/".to_string()
}
