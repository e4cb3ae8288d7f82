//! Baseline roles.
//!
//! Migrations seed the permission catalogue and three roles. `seed`
//! recreates missing baseline roles and resets their permission sets,
//! leaving custom roles alone.

use clap::Args;
use serde_json::json;
use sqlx::PgPool;

use comhub_core::error::AppError;
use comhub_database::repositories::RoleRepository;
use comhub_entity::audit::CreateAuditLogEntry;

use crate::output;

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Print the permission sets without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Resource prefixes managed by organizers.
const ORGANIZER_RESOURCES: &[&str] = &["events", "registrations", "mentors", "partners", "roadmaps"];

/// Baseline roles with their descriptions.
const BASELINE_ROLES: &[(&str, &str)] = &[
    ("admin", "Full administrative access"),
    ("organizer", "Runs events and community content"),
    ("viewer", "Read-only administrative access"),
];

/// Permissions a baseline role holds out of the catalogue.
fn baseline_permissions(role: &str, catalogue: &[String]) -> Vec<String> {
    catalogue
        .iter()
        .filter(|name| match role {
            "admin" => true,
            "organizer" => name
                .split_once(':')
                .is_some_and(|(resource, _)| ORGANIZER_RESOURCES.contains(&resource)),
            "viewer" => name.ends_with(":read"),
            _ => false,
        })
        .cloned()
        .collect()
}

/// Execute the seed command
pub async fn execute(args: &SeedArgs, pool: &PgPool) -> Result<(), AppError> {
    let roles = RoleRepository::new(pool.clone());
    let catalogue: Vec<String> = roles
        .list_permissions()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();
    if catalogue.is_empty() {
        return Err(AppError::internal("The permission catalogue is empty; run `migrate` first"));
    }

    for &(name, description) in BASELINE_ROLES {
        let permissions = baseline_permissions(name, &catalogue);
        if args.dry_run {
            output::print_kv(name, &permissions.join(" "));
            continue;
        }

        let role = match roles.find_by_name(name).await? {
            Some(role) => role,
            None => {
                let role = roles.create(name, Some(description)).await?;
                output::print_success(&format!("Created role '{name}'"));
                role
            }
        };

        let audit = CreateAuditLogEntry::new(None, "role.seeded", "role", Some(role.id))
            .details(json!({ "permissions": permissions }));
        roles.set_permissions(role.id, &permissions, &audit).await?;
        output::print_success(&format!("Role '{name}' holds {} permissions", permissions.len()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<String> {
        ["audit:read", "events:read", "events:write", "registrations:approve", "users:write"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_baseline_sets() {
        assert_eq!(baseline_permissions("admin", &catalogue()).len(), 5);
        assert_eq!(
            baseline_permissions("organizer", &catalogue()),
            vec!["events:read", "events:write", "registrations:approve"]
        );
        assert_eq!(
            baseline_permissions("viewer", &catalogue()),
            vec!["audit:read", "events:read"]
        );
        assert!(baseline_permissions("custom", &catalogue()).is_empty());
    }
}
