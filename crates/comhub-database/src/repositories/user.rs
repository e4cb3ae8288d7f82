//! User repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::{SortSpec, SortWhitelist};
use comhub_entity::audit::CreateAuditLogEntry;
use comhub_entity::rbac::RoleAssignment;
use comhub_entity::user::{CreateUser, UpdateUser, User};

use super::audit::insert_entry;
use crate::query::{Conditions, Filter, db_error, fetch_page, is_unique_violation};

/// Sortable user fields.
pub const USER_SORT: SortWhitelist = &[
    ("email", "u.email"),
    ("display_name", "u.display_name"),
    ("created_at", "u.created_at"),
    ("last_login_at", "u.last_login_at"),
];

/// Typed filters for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Matches email or display name.
    pub search: Option<TextSearch>,
    pub is_active: Option<bool>,
    /// Only users currently holding this role.
    pub role: Option<String>,
}

/// One role grant in a role replacement.
#[derive(Debug, Clone)]
pub struct RoleGrant {
    pub role_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Repository for user CRUD and role assignment.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }

    /// List users with filters, sorting and pagination.
    pub async fn list(
        &self,
        filter: &UserFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let apply = |qb: &mut Filter| {
            let mut cond = Conditions::new(qb);
            if let Some(search) = &filter.search {
                let pattern = search.pattern();
                cond.next()
                    .push("(u.email ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR u.display_name ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(active) = filter.is_active {
                cond.next().push("u.is_active = ").push_bind(active);
            }
            if let Some(role) = &filter.role {
                cond.next()
                    .push(
                        "EXISTS (SELECT 1 FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
                         WHERE ur.user_id = u.id AND (ur.expires_at IS NULL OR ur.expires_at > NOW()) \
                         AND r.name = ",
                    )
                    .push_bind(role.clone())
                    .push(")");
            }
        };

        fetch_page(
            &self.pool,
            "u.*",
            "FROM users u",
            apply,
            &sort.order_by("u.id"),
            page,
            "Failed to list users",
        )
        .await
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, display_name, is_super_admin) \
             VALUES (LOWER($1), $2, $3, $4) \
             RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.display_name)
        .bind(data.is_super_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_email_key") {
                AppError::conflict(format!("Email '{}' is already registered", data.email))
                    .with_code("EMAIL_TAKEN")
            } else {
                AppError::database("Failed to create user", e)
            }
        })
    }

    /// Update profile fields and flags.
    ///
    /// Deactivating a user revokes all of their refresh tokens in the same
    /// transaction. Returns the updated user and the number of tokens revoked.
    pub async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<(User, u64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET display_name = COALESCE($2, display_name), \
                              is_active = COALESCE($3, is_active), \
                              is_super_admin = COALESCE($4, is_super_admin), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.display_name)
        .bind(data.is_active)
        .bind(data.is_super_admin)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        let revoked = if data.is_active == Some(false) {
            sqlx::query(
                "UPDATE refresh_tokens SET revoked_at = NOW() \
                 WHERE user_id = $1 AND revoked_at IS NULL",
            )
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to revoke refresh tokens"))?
            .rows_affected()
        } else {
            0
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit user update"))?;
        Ok((user, revoked))
    }

    /// Replace the password hash and revoke every refresh token of the user,
    /// atomically. Returns the number of tokens revoked.
    pub async fn update_password_and_revoke(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let updated =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(password_hash)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to update password"))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to revoke refresh tokens"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(db_error("Failed to commit password change"))?;
        Ok(revoked)
    }

    /// Update last login timestamp.
    pub async fn update_last_login(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update last login"))?;
        Ok(())
    }

    /// Delete a user by ID.
    pub async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;

        Ok(result.rows_affected() > 0)
    }

    /// All role assignments of a user, including expired ones.
    pub async fn role_assignments(&self, user_id: Uuid) -> AppResult<Vec<RoleAssignment>> {
        sqlx::query_as::<_, RoleAssignment>(
            "SELECT ur.role_id, r.name AS role_name, ur.granted_by, ur.granted_at, ur.expires_at \
             FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = $1 ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load role assignments"))
    }

    /// Replace all role assignments of a user in one transaction and record
    /// the change in the audit log.
    pub async fn replace_roles(
        &self,
        user_id: Uuid,
        grants: &[RoleGrant],
        granted_by: Option<Uuid>,
        audit: &CreateAuditLogEntry,
    ) -> AppResult<Vec<RoleAssignment>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock user"))?;
        if exists.is_none() {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        let role_ids: Vec<Uuid> = grants.iter().map(|g| g.role_id).collect();
        let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE id = ANY($1)")
            .bind(&role_ids)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to check roles"))?;
        if known as usize != role_ids.len() {
            return Err(AppError::invalid_field(
                "roles",
                "One or more roles do not exist",
            ));
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear role assignments"))?;

        for grant in grants {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id, granted_by, expires_at) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(grant.role_id)
            .bind(granted_by)
            .bind(grant.expires_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert role assignment"))?;
        }

        insert_entry(&mut tx, audit).await?;

        let assignments = sqlx::query_as::<_, RoleAssignment>(
            "SELECT ur.role_id, r.name AS role_name, ur.granted_by, ur.granted_at, ur.expires_at \
             FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = $1 ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to load role assignments"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit role replacement"))?;
        Ok(assignments)
    }

    /// Count users.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;
        Ok(count as u64)
    }
}
