//! # visum-entity
//!
//! Domain entity models for Visum: the job record and its status machine,
//! the dispatch message carried on the queue, and the upload value objects
//! exchanged with the presigning collaborator.

pub mod job;
pub mod upload;
