//! Built-in job processors.

pub mod http;

pub use http::HttpSummarizerProcessor;
