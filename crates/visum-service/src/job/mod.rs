//! Job submission, status transitions, and status reads.

pub mod orchestrator;
pub mod status;

pub use orchestrator::{JobOrchestrator, SubmitReceipt, Transition};
pub use status::StatusReader;
