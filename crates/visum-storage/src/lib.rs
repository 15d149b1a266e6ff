//! # visum-storage
//!
//! Object storage collaborator for Visum: issues presigned direct-upload
//! URLs against an S3-compatible store (AWS S3 or MinIO), generates the
//! unique object keys they are scoped to, and resolves a submitted object
//! key into the location a worker fetches from.

pub mod keys;
pub mod location;
pub mod providers;

pub use keys::upload_key;
pub use location::LocationResolver;
