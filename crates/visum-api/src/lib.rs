//! # visum-api
//!
//! HTTP API layer for Visum built on Axum.
//!
//! Provides the job submission, status poll, presigned upload, and health
//! endpoints, the middleware stack (CORS, request logging, tracing,
//! compression, timeouts), request/response DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
