//! Access log for every request.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Emits one line per request after the response is produced.
///
/// `route` is the matched template (`/api/v1/events/{id}`) so log
/// aggregation groups by endpoint rather than by concrete id.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| "-".to_owned());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        warn!(%method, %path, %route, status, elapsed_ms, "Request failed");
    } else {
        info!(%method, %path, %route, status, elapsed_ms, "Request served");
    }

    response
}
