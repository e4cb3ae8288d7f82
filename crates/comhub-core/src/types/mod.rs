//! Core type definitions used across the ComHub workspace.

pub mod filter;
pub mod pagination;
pub mod sorting;

pub use filter::{TextSearch, TimeRange};
pub use pagination::{PageRequest, PageResponse};
pub use sorting::{SortDirection, SortField, SortSpec};
