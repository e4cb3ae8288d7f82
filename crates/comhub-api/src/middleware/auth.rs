//! Bearer authentication for whole route groups.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::auth::authenticate;
use crate::state::AppState;

/// Rejects requests without a valid access token.
///
/// The resolved `AuthUser` is stored in the request extensions, so the
/// extractor in the handler does not validate the token a second time.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    authenticate(&mut parts, &state).await?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}
