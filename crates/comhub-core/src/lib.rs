//! # comhub-core
//!
//! Core crate for ComHub. Contains the unified error taxonomy,
//! configuration schemas, pagination/sorting/filter types and the traits
//! implemented by the storage and cache crates.
//!
//! This crate has **no** internal dependencies on other ComHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
