//! # visum-service
//!
//! Job lifecycle services for Visum. Each service works against the
//! backend traits from `visum-core`, so the same code runs over Redis in
//! production and over the in-memory providers in tests.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod job;
pub mod upload;

pub use job::{JobOrchestrator, StatusReader, SubmitReceipt, Transition};
pub use upload::UploadService;
