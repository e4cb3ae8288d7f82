//! Auth handlers: login, refresh, logout, profile and password change.

use axum::extract::State;
use axum::http::StatusCode;

use comhub_auth::token::IssuedTokens;
use comhub_service::auth::{LoginResult, Profile};

use crate::dto::request::{ChangePasswordRequest, LoginRequest, RefreshRequest};
use crate::dto::response::{ApiResponse, PasswordChangedResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ClientMeta, ValidJson};
use crate::state::AppState;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResult>> {
    let result = state
        .auth_service
        .login(&req.email, &req.password, client)
        .await?;
    Ok(ApiResponse::ok(result))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<ApiResponse<IssuedTokens>> {
    let tokens = state
        .auth_service
        .refresh(&req.refresh_token, client)
        .await?;
    Ok(ApiResponse::ok(tokens))
}

/// POST /api/v1/auth/logout
///
/// The bearer token is optional; when present it is denylisted as well.
pub async fn logout(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth_service
        .logout(&req.refresh_token, auth.as_ref().map(|a| &a.claims))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<ApiResponse<Profile>> {
    let profile = state.auth_service.me(&auth).await?;
    Ok(ApiResponse::ok(profile))
}

/// PUT /api/v1/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<PasswordChangedResponse>> {
    let revoked_sessions = state
        .auth_service
        .change_password(&auth, &req.current_password, &req.new_password)
        .await?;
    Ok(ApiResponse::ok(PasswordChangedResponse { revoked_sessions }))
}
