//! HTTP request handlers.

pub mod health;
pub mod result;
pub mod summary;
pub mod upload;
