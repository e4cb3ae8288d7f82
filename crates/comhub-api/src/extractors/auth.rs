//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header, validates it, and injects the caller's context.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use comhub_auth::jwt::Claims;
use comhub_auth::token::ClientInfo;
use comhub_core::error::AppError;
use comhub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
///
/// Derefs to the [`RequestContext`] handed to services. The validated
/// claims are kept for logout, which denylists the access token's `jti`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub ctx: RequestContext,
    pub claims: Claims,
}

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

/// Validate the bearer token of a request.
///
/// Reuses the result of the auth middleware when it already ran.
pub(crate) async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<AuthUser, ApiError> {
    if let Some(user) = parts.extensions.get::<AuthUser>() {
        return Ok(user.clone());
    }

    let TypedHeader(Authorization(bearer)) =
        <TypedHeader<Authorization<Bearer>> as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                let message = if rejection.is_missing() {
                    "Missing bearer token"
                } else {
                    "Malformed Authorization header"
                };
                AppError::unauthorized(message).with_code("MISSING_TOKEN")
            })?;

    let claims = state.tokens.authenticate(bearer.token()).await?;

    let ctx = RequestContext::from_claims(&claims, client_ip(parts), user_agent(parts));
    let user = AuthUser { ctx, claims };
    parts.extensions.insert(user.clone());
    Ok(user)
}

/// First hop of `X-Forwarded-For`, falling back to `X-Real-IP`.
pub(crate) fn client_ip(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| parts.headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn user_agent(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await
    }
}

/// Public endpoints accept anonymous callers, but a token that is present
/// must be valid.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key("authorization") {
            return Ok(None);
        }
        authenticate(parts, state).await.map(Some)
    }
}

/// Client address and user agent, recorded with issued refresh tokens.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta(pub ClientInfo);

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(ClientInfo {
            user_agent: user_agent(parts),
            ip_address: client_ip(parts),
        }))
    }
}
