//! Role and permission repository, plus the Postgres grant source.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::traits::grants::{GrantSource, UserGrants};
use comhub_entity::audit::CreateAuditLogEntry;
use comhub_entity::rbac::{Permission, Role, RoleWithPermissions};

use super::audit::insert_entry;
use crate::query::{db_error, is_unique_violation};

/// Repository for roles, permissions and their mapping.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every role with its permission names.
    pub async fn list(&self) -> AppResult<Vec<RoleWithPermissions>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list roles"))?;

        let pairs: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT rp.role_id, p.name FROM role_permissions rp \
             JOIN permissions p ON p.id = rp.permission_id ORDER BY p.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list role permissions"))?;

        Ok(roles
            .into_iter()
            .map(|role| {
                let permissions = pairs
                    .iter()
                    .filter(|(role_id, _)| *role_id == role.id)
                    .map(|(_, name)| name.clone())
                    .collect();
                RoleWithPermissions { role, permissions }
            })
            .collect())
    }

    /// Find a role with its permissions.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoleWithPermissions>> {
        let Some(role) = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find role"))?
        else {
            return Ok(None);
        };

        let permissions = self.permission_names(id).await?;
        Ok(Some(RoleWithPermissions { role, permissions }))
    }

    /// Find a role by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find role by name"))
    }

    async fn permission_names(&self, role_id: Uuid) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT p.name FROM role_permissions rp JOIN permissions p ON p.id = rp.permission_id \
             WHERE rp.role_id = $1 ORDER BY p.name",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load role permissions"))
    }

    /// Create a role.
    pub async fn create(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "roles_name_key") {
                AppError::conflict(format!("Role '{name}' already exists")).with_code("ROLE_EXISTS")
            } else {
                AppError::database("Failed to create role", e)
            }
        })
    }

    /// Rename or re-describe a role.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = COALESCE($2, name), \
                              description = COALESCE($3, description), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "roles_name_key") {
                AppError::conflict("A role with that name already exists").with_code("ROLE_EXISTS")
            } else {
                AppError::database("Failed to update role", e)
            }
        })?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    /// Delete a role; its assignments cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete role"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the permission set of a role in one transaction.
    pub async fn set_permissions(
        &self,
        role_id: Uuid,
        names: &[String],
        audit: &CreateAuditLogEntry,
    ) -> AppResult<RoleWithPermissions> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1 FOR UPDATE")
            .bind(role_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock role"))?
            .ok_or_else(|| AppError::not_found(format!("Role {role_id} not found")))?;

        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM permissions WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to resolve permissions"))?;
        if ids.len() != names.len() {
            return Err(AppError::invalid_field(
                "permissions",
                "One or more permissions do not exist",
            ));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear role permissions"))?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(role_id)
        .bind(&ids)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert role permissions"))?;

        sqlx::query("UPDATE roles SET updated_at = NOW() WHERE id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to touch role"))?;

        insert_entry(&mut tx, audit).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit permission change"))?;

        let mut permissions = names.to_vec();
        permissions.sort();
        Ok(RoleWithPermissions { role, permissions })
    }

    /// List all known permissions.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list permissions"))
    }
}

#[async_trait]
impl GrantSource for RoleRepository {
    async fn load_grants(&self, user_id: Uuid) -> AppResult<Option<UserGrants>> {
        let user: Option<(String, bool, bool)> = sqlx::query_as(
            "SELECT email, is_active, is_super_admin FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load user for grants"))?;

        let Some((email, is_active, is_super_admin)) = user else {
            return Ok(None);
        };

        let roles: Vec<String> = sqlx::query_scalar(
            "SELECT r.name FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = $1 AND (ur.expires_at IS NULL OR ur.expires_at > NOW()) \
             ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load user roles"))?;

        let permissions: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT p.name FROM user_roles ur \
             JOIN role_permissions rp ON rp.role_id = ur.role_id \
             JOIN permissions p ON p.id = rp.permission_id \
             WHERE ur.user_id = $1 AND (ur.expires_at IS NULL OR ur.expires_at > NOW()) \
             ORDER BY p.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load user permissions"))?;

        Ok(Some(UserGrants {
            user_id,
            email,
            is_active,
            is_super_admin,
            roles,
            permissions,
        }))
    }
}
