//! Resolves submitted object keys to canonical storage locations.

use visum_entity::upload::ObjectLocation;

/// Maps an object key onto the configured bucket.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    bucket: String,
}

impl LocationResolver {
    /// Create a resolver for `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    /// Location the worker fetches `object_key` from.
    pub fn resolve(&self, object_key: &str) -> ObjectLocation {
        ObjectLocation {
            bucket: self.bucket.clone(),
            key: object_key.trim_start_matches('/').to_string(),
        }
    }
}
