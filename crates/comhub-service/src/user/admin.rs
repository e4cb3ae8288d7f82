//! Admin user management: CRUD, role assignment and deactivation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use comhub_auth::password::{PasswordHasher, PasswordValidator};
use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortSpec;
use comhub_database::repositories::audit::AuditLogRepository;
use comhub_database::repositories::user::{RoleGrant, UserFilter, UserRepository};
use comhub_entity::audit::CreateAuditLogEntry;
use comhub_entity::rbac::RoleAssignment;
use comhub_entity::user::{CreateUser, UpdateUser, User};

use crate::context::RequestContext;
use crate::validation::normalize_email;

/// Request to create a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    /// Initial password. Accounts without one can only sign in through OAuth.
    pub password: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_super_admin: bool,
}

/// Partial update of a user's profile and flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_super_admin: Option<bool>,
}

/// One entry of a role replacement.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleGrantRequest {
    pub role_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A user together with their role assignments.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<RoleAssignment>,
}

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    users: Arc<UserRepository>,
    audit: Arc<AuditLogRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
}

impl AdminUserService {
    pub fn new(
        users: Arc<UserRepository>,
        audit: Arc<AuditLogRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            users,
            audit,
            hasher,
            validator,
        }
    }

    /// Lists users with filters, sorting and pagination.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &UserFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        ctx.require("users:read")?;
        self.users.list(filter, sort, page).await
    }

    /// Gets a single user with their role assignments.
    pub async fn get(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<UserDetail> {
        ctx.require("users:read")?;
        let user = self.find(user_id).await?;
        let roles = self.users.role_assignments(user_id).await?;
        Ok(UserDetail { user, roles })
    }

    /// Creates a user. Only super-admins may create other super-admins.
    pub async fn create(&self, ctx: &RequestContext, req: CreateUserRequest) -> AppResult<User> {
        ctx.require("users:write")?;
        if req.is_super_admin && !ctx.is_super_admin() {
            return Err(AppError::forbidden("Only super-admins can grant super-admin"));
        }

        let password_hash = match req.password.as_deref() {
            Some(password) => {
                self.validator.validate("password", password)?;
                Some(self.hasher.hash_password(password)?)
            }
            None => None,
        };

        let user = self
            .users
            .create(&CreateUser {
                email: normalize_email(&req.email),
                password_hash,
                display_name: req.display_name,
                is_super_admin: req.is_super_admin,
            })
            .await?;

        self.record(
            ctx,
            CreateAuditLogEntry::new(Some(ctx.user_id), "user.created", "user", Some(user.id))
                .details(json!({ "email": user.email, "is_super_admin": user.is_super_admin })),
        )
        .await?;

        info!(user_id = %user.id, created_by = %ctx.user_id, "User created");
        Ok(user)
    }

    /// Updates profile fields and flags. Deactivation revokes the user's
    /// refresh tokens in the same transaction.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        req: UpdateUserRequest,
    ) -> AppResult<User> {
        ctx.require("users:write")?;
        if req.is_super_admin.is_some() && !ctx.is_super_admin() {
            return Err(AppError::forbidden("Only super-admins can change super-admin status"));
        }
        if user_id == ctx.user_id && req.is_active == Some(false) {
            return Err(AppError::bad_request("You cannot deactivate your own account")
                .with_code("SELF_DEACTIVATION"));
        }

        let changes = UpdateUser {
            display_name: req.display_name,
            is_active: req.is_active,
            is_super_admin: req.is_super_admin,
        };
        let (user, revoked) = self.users.update(user_id, &changes).await?;

        self.record(
            ctx,
            CreateAuditLogEntry::new(Some(ctx.user_id), "user.updated", "user", Some(user_id))
                .details(json!({
                    "is_active": changes.is_active,
                    "is_super_admin": changes.is_super_admin,
                    "revoked_tokens": revoked,
                })),
        )
        .await?;

        info!(user_id = %user_id, updated_by = %ctx.user_id, revoked, "User updated");
        Ok(user)
    }

    /// Deactivates a user and revokes all of their sessions.
    pub async fn deactivate(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<User> {
        self.update(
            ctx,
            user_id,
            UpdateUserRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Replaces every role assignment of a user in one transaction.
    pub async fn replace_roles(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        grants: Vec<RoleGrantRequest>,
    ) -> AppResult<Vec<RoleAssignment>> {
        ctx.require("users:write")?;

        let now = Utc::now();
        let mut seen = Vec::with_capacity(grants.len());
        for grant in &grants {
            if seen.contains(&grant.role_id) {
                return Err(AppError::invalid_field("roles", "Each role may be granted once"));
            }
            if grant.expires_at.is_some_and(|at| at <= now) {
                return Err(AppError::invalid_field("roles", "expires_at must be in the future"));
            }
            seen.push(grant.role_id);
        }

        let grants: Vec<RoleGrant> = grants
            .into_iter()
            .map(|g| RoleGrant {
                role_id: g.role_id,
                expires_at: g.expires_at,
            })
            .collect();

        let audit = CreateAuditLogEntry::new(
            Some(ctx.user_id),
            "user.roles_replaced",
            "user",
            Some(user_id),
        )
        .details(json!({ "role_ids": seen }))
        .ip(ctx.ip_address.clone());

        let assignments = self
            .users
            .replace_roles(user_id, &grants, Some(ctx.user_id), &audit)
            .await?;

        info!(
            user_id = %user_id,
            granted_by = %ctx.user_id,
            roles = assignments.len(),
            "User roles replaced"
        );
        Ok(assignments)
    }

    /// Deletes a user. Admins cannot delete themselves.
    pub async fn delete(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<()> {
        ctx.require("users:write")?;
        if user_id == ctx.user_id {
            return Err(AppError::bad_request("You cannot delete your own account")
                .with_code("SELF_DELETION"));
        }

        if !self.users.delete(user_id).await? {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        self.record(
            ctx,
            CreateAuditLogEntry::new(Some(ctx.user_id), "user.deleted", "user", Some(user_id)),
        )
        .await?;

        info!(user_id = %user_id, deleted_by = %ctx.user_id, "User deleted");
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn record(&self, ctx: &RequestContext, entry: CreateAuditLogEntry) -> AppResult<()> {
        self.audit.create(&entry.ip(ctx.ip_address.clone())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_defaults_to_no_changes() {
        let req: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.display_name.is_none());
        assert!(req.is_active.is_none());
        assert!(req.is_super_admin.is_none());
    }

    #[test]
    fn test_create_request_super_admin_defaults_false() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"email":"ana@example.org"}"#).unwrap();
        assert!(!req.is_super_admin);
        assert!(req.password.is_none());
    }
}
