//! Presigned direct uploads.

pub mod service;

pub use service::UploadService;
