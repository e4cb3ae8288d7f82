//! Role and permission administration.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_database::repositories::audit::AuditLogRepository;
use comhub_database::repositories::role::RoleRepository;
use comhub_entity::audit::CreateAuditLogEntry;
use comhub_entity::rbac::{Permission, Role, RoleWithPermissions};

use crate::context::RequestContext;

/// Request to create a role.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    /// Initial permission names.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Request to rename or re-describe a role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Manages roles and their permission sets.
#[derive(Debug, Clone)]
pub struct RoleService {
    roles: Arc<RoleRepository>,
    audit: Arc<AuditLogRepository>,
}

/// Role names are lower-case identifiers such as `organizer`.
fn validate_role_name(name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_field(
            "name",
            "must be 1-64 lower-case letters, digits, '_' or '-'",
        ))
    }
}

fn normalize_permissions(mut names: Vec<String>) -> Vec<String> {
    for name in &mut names {
        *name = name.trim().to_string();
    }
    names.retain(|n| !n.is_empty());
    names.sort();
    names.dedup();
    names
}

impl RoleService {
    pub fn new(roles: Arc<RoleRepository>, audit: Arc<AuditLogRepository>) -> Self {
        Self { roles, audit }
    }

    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<RoleWithPermissions>> {
        ctx.require("roles:read")?;
        self.roles.list().await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<RoleWithPermissions> {
        ctx.require("roles:read")?;
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    /// Creates a role, then assigns its initial permissions.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateRoleRequest,
    ) -> AppResult<RoleWithPermissions> {
        ctx.require("roles:write")?;
        let name = req.name.trim().to_string();
        validate_role_name(&name)?;

        let role = self.roles.create(&name, req.description.as_deref()).await?;
        let permissions = normalize_permissions(req.permissions);

        let audit = CreateAuditLogEntry::new(Some(ctx.user_id), "role.created", "role", Some(role.id))
            .details(json!({ "name": role.name, "permissions": permissions }))
            .ip(ctx.ip_address.clone());

        let created = self.roles.set_permissions(role.id, &permissions, &audit).await;
        match created {
            Ok(role) => {
                info!(role = %role.role.name, created_by = %ctx.user_id, "Role created");
                Ok(role)
            }
            Err(e) => {
                // Keep creation all-or-nothing from the caller's view
                self.roles.delete(role.id).await?;
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateRoleRequest,
    ) -> AppResult<Role> {
        ctx.require("roles:write")?;
        let name = req.name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            validate_role_name(name)?;
        }

        let role = self
            .roles
            .update(id, name.as_deref(), req.description.as_deref())
            .await?;

        self.audit
            .create(
                &CreateAuditLogEntry::new(Some(ctx.user_id), "role.updated", "role", Some(id))
                    .details(json!({ "name": role.name }))
                    .ip(ctx.ip_address.clone()),
            )
            .await?;
        Ok(role)
    }

    /// Deletes a role; users holding it lose it immediately.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require("roles:write")?;
        if !self.roles.delete(id).await? {
            return Err(AppError::not_found(format!("Role {id} not found")));
        }

        self.audit
            .create(
                &CreateAuditLogEntry::new(Some(ctx.user_id), "role.deleted", "role", Some(id))
                    .ip(ctx.ip_address.clone()),
            )
            .await?;
        info!(role_id = %id, deleted_by = %ctx.user_id, "Role deleted");
        Ok(())
    }

    /// Replaces the permission set of a role in one transaction.
    pub async fn set_permissions(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        permissions: Vec<String>,
    ) -> AppResult<RoleWithPermissions> {
        ctx.require("roles:write")?;
        let permissions = normalize_permissions(permissions);

        let audit = CreateAuditLogEntry::new(
            Some(ctx.user_id),
            "role.permissions_replaced",
            "role",
            Some(id),
        )
        .details(json!({ "permissions": permissions }))
        .ip(ctx.ip_address.clone());

        let role = self.roles.set_permissions(id, &permissions, &audit).await?;
        info!(
            role = %role.role.name,
            permissions = role.permissions.len(),
            "Role permissions replaced"
        );
        Ok(role)
    }

    pub async fn list_permissions(&self, ctx: &RequestContext) -> AppResult<Vec<Permission>> {
        ctx.require("roles:read")?;
        self.roles.list_permissions().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert!(validate_role_name("organizer").is_ok());
        assert!(validate_role_name("event_staff-2").is_ok());
        assert!(validate_role_name("").is_err());
        assert!(validate_role_name("Admin").is_err());
        assert!(validate_role_name("a b").is_err());
    }

    #[test]
    fn test_permissions_are_trimmed_and_deduplicated() {
        let names = normalize_permissions(vec![
            " events:write".into(),
            "events:read".into(),
            "events:write".into(),
            "  ".into(),
        ]);
        assert_eq!(names, vec!["events:read", "events:write"]);
    }
}
