//! Upload value objects exchanged with the presigning collaborator.

pub mod location;
pub mod presign;

pub use location::ObjectLocation;
pub use presign::{PresignedUrlRequest, PresignedUrlResponse};
