//! Authentication service.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use comhub_auth::jwt::Claims;
use comhub_auth::password::{PasswordHasher, PasswordValidator};
use comhub_auth::token::{ClientInfo, IssuedTokens, TokenService};
use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_database::repositories::user::UserRepository;
use comhub_entity::rbac::RoleAssignment;
use comhub_entity::user::User;

use crate::context::RequestContext;
use crate::validation::normalize_email;

/// Outcome of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    #[serde(flatten)]
    pub tokens: IssuedTokens,
    pub user: User,
}

/// The caller's own account as seen through their token.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub roles: Vec<RoleAssignment>,
    /// Permission snapshot of the presented access token.
    pub permissions: Vec<String>,
}

/// Handles credential checks and token lifecycle for end users.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<UserRepository>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid email or password").with_code("INVALID_CREDENTIALS")
}

impl AuthService {
    pub fn new(
        users: Arc<UserRepository>,
        tokens: Arc<TokenService>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            validator,
        }
    }

    /// Exchange email and password for a token pair.
    pub async fn login(&self, email: &str, password: &str, client: ClientInfo) -> AppResult<LoginResult> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            self.hasher.verify_dummy(password);
            return Err(invalid_credentials());
        };

        // OAuth-only accounts have no password hash
        let Some(hash) = user.password_hash.as_deref() else {
            self.hasher.verify_dummy(password);
            return Err(invalid_credentials());
        };
        if !self.hasher.verify_password(password, hash)? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid_credentials());
        }
        if !user.is_active {
            return Err(AppError::unauthorized("Account is deactivated").with_code("ACCOUNT_DISABLED"));
        }

        let tokens = self.tokens.issue(user.id, client).await?;
        self.users.update_last_login(user.id).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginResult { tokens, user })
    }

    /// Rotate a refresh token.
    pub async fn refresh(&self, refresh_token: &str, client: ClientInfo) -> AppResult<IssuedTokens> {
        self.tokens.refresh(refresh_token, client).await
    }

    /// Revoke the session of `refresh_token`, and the access token if given.
    pub async fn logout(&self, refresh_token: &str, access: Option<&Claims>) -> AppResult<()> {
        self.tokens.logout(refresh_token, access).await
    }

    /// The caller's account, role assignments and current permission snapshot.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<Profile> {
        let user = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let roles = self.users.role_assignments(ctx.user_id).await?;

        Ok(Profile {
            user,
            roles,
            permissions: ctx.capabilities.permissions().to_vec(),
        })
    }

    /// Change the caller's password and revoke all of their refresh tokens
    /// in one transaction. Returns the number of revoked tokens.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<u64> {
        let user = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AppError::bad_request("Account has no password to change")
                .with_code("NO_PASSWORD"));
        };
        if !self.hasher.verify_password(current_password, hash)? {
            return Err(AppError::invalid_field("current_password", "is incorrect"));
        }

        self.validator.validate_not_same(current_password, new_password)?;
        self.validator.validate("new_password", new_password)?;

        let new_hash = self.hasher.hash_password(new_password)?;
        let revoked = self.users.update_password_and_revoke(user.id, &new_hash).await?;

        info!(user_id = %user.id, revoked, "Password changed");
        Ok(revoked)
    }
}
