//! Custom Axum extractors.

pub mod auth;
pub mod body;
pub mod pagination;
pub mod path;

pub use auth::{AuthUser, ClientMeta};
pub use body::{JsonBody, QueryParams, ValidJson};
pub use pagination::ListParams;
pub use path::IdPath;
