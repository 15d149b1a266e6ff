//! # visum-store
//!
//! Job store implementations for Visum. Supports two modes:
//!
//! - **redis**: one Redis hash per job, using the [redis](https://crates.io/crates/redis) crate
//! - **memory**: in-process map backed by [dashmap](https://crates.io/crates/dashmap)
//!
//! The provider is selected at runtime based on configuration and wrapped
//! in a [`JobStoreManager`] that bounds every call with a timeout and
//! retries connectivity failures.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::JobStoreManager;
