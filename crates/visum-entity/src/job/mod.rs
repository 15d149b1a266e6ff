//! Job domain entities.

pub mod model;
pub mod payload;
pub mod status;

pub use model::{Job, fields};
pub use payload::DispatchMessage;
pub use status::JobStatus;
