//! Canonical location of an uploaded object.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a worker fetches an uploaded artifact from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
