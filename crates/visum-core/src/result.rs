//! Convenience result type alias for Visum.

use crate::error::AppError;

/// A specialized `Result` type for Visum operations.
pub type AppResult<T> = Result<T, AppError>;
