//! Convenience result type alias for ComHub.

use crate::error::AppError;

/// A specialized `Result` type for ComHub operations.
pub type AppResult<T> = Result<T, AppError>;
