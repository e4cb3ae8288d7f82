//! # comhub-api
//!
//! HTTP API layer for ComHub built on Axum.
//!
//! Provides the REST endpoints under `/api/v1`, the middleware stack
//! (authentication, request logging, CORS, compression), extractors,
//! DTOs and the mapping from [`comhub_core::AppError`] to the JSON error
//! envelope.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
