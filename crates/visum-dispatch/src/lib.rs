//! # visum-dispatch
//!
//! Durable, at-least-once dispatch of job requests to workers.
//!
//! - **redis**: a Redis Stream per exchange and routing key, consumed by a
//!   consumer group named after the queue
//! - **memory**: in-process queue with the same pending/ack semantics
//!
//! [`DispatchManager`] selects the provider from configuration and bounds
//! every publish with a timeout.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::DispatchManager;
