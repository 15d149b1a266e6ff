//! Presigned upload request and response.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Request for a direct-upload URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlRequest {
    /// Client-chosen file name.
    pub key_name: String,
    /// Optional user metadata attached to the uploaded object.
    #[serde(default)]
    pub meta_data: Option<HashMap<String, String>>,
}

/// An issued direct-upload URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlResponse {
    /// Storage key the URL writes to; submit this as the job's object key.
    pub key_name: String,
    /// Time-limited `PUT` URL.
    pub url: String,
}
