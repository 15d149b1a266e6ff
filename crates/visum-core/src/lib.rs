//! # visum-core
//!
//! Core crate for Visum. Contains the backend traits (job store, dispatch
//! channel, presign collaborator), configuration schemas, typed job
//! identifiers, the retry combinator, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Visum crates.

pub mod config;
pub mod error;
pub mod result;
pub mod retry;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
