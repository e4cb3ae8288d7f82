//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use comhub_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /api/v1/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/v1/health/ready
///
/// Answers `503` while the database or the cache is unreachable.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<ReadinessResponse>>) {
    let database = match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Database readiness check failed");
            false
        }
    };
    let cache = match state.cache.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!(error = %e, "Cache readiness check failed");
            false
        }
    };

    let label = |ok: bool| if ok { "up" } else { "down" }.to_string();
    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(ReadinessResponse {
            status: if status == StatusCode::OK { "ok" } else { "degraded" }.to_string(),
            database: label(database),
            cache: label(cache),
        })),
    )
}
