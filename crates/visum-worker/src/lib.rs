//! Dispatch consumer and job processing runtime for Visum.
//!
//! This crate provides:
//! - A worker runner that reads job requests from the dispatch channel
//!   through a consumer group and processes them concurrently
//! - A delivery handler driving one job through its status transitions
//! - The [`JobProcessor`] seam plus a processor that calls an HTTP
//!   summarizer service

pub mod handler;
pub mod processor;
pub mod processors;
pub mod runner;

pub use handler::{DeliveryHandler, HandleOutcome};
pub use processor::{JobProcessor, ProcessingError};
pub use processors::HttpSummarizerProcessor;
pub use runner::WorkerRunner;
