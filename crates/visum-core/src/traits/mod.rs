//! Core traits defined in `visum-core` and implemented by other crates.

pub mod dispatch;
pub mod storage;
pub mod store;

pub use dispatch::{DispatchChannel, DispatchConsumer, Delivery};
pub use storage::PresignProvider;
pub use store::{CasOutcome, JobStore, Record};
