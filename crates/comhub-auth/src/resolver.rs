//! Role/permission snapshot resolution.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::traits::grants::{GrantSource, UserGrants};

use crate::capability;

/// Resolves the grant snapshot that goes into an access token.
///
/// Role and permission names are de-duplicated and sorted. Super-admins get
/// exactly `["*:*"]` as their permission list; their role names are kept.
#[derive(Clone)]
pub struct PermissionResolver {
    source: Arc<dyn GrantSource>,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver").finish_non_exhaustive()
    }
}

impl PermissionResolver {
    pub fn new(source: Arc<dyn GrantSource>) -> Self {
        Self { source }
    }

    /// Resolve grants for an active user.
    ///
    /// Unknown and deactivated users are `Unauthorized`.
    pub async fn resolve(&self, user_id: Uuid) -> Result<UserGrants, AppError> {
        let grants = self
            .source
            .load_grants(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

        if !grants.is_active {
            return Err(AppError::unauthorized("Account is deactivated").with_code("ACCOUNT_DISABLED"));
        }

        let grants = normalize(grants);
        debug!(
            user_id = %user_id,
            roles = grants.roles.len(),
            permissions = grants.permissions.len(),
            "Resolved grants"
        );
        Ok(grants)
    }
}

fn normalize(mut grants: UserGrants) -> UserGrants {
    grants.roles.sort();
    grants.roles.dedup();
    if grants.is_super_admin {
        grants.permissions = vec![capability::ALL.to_string()];
    } else {
        grants.permissions.sort();
        grants.permissions.dedup();
    }
    grants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGrantSource;

    fn grants(user_id: Uuid) -> UserGrants {
        UserGrants {
            user_id,
            email: "a@example.org".into(),
            is_active: true,
            is_super_admin: false,
            roles: vec!["viewer".into(), "organizer".into(), "viewer".into()],
            permissions: vec![
                "events:write".into(),
                "events:read".into(),
                "events:read".into(),
            ],
        }
    }

    #[tokio::test]
    async fn test_resolve_sorts_and_dedups() {
        let source = MemoryGrantSource::new();
        let id = Uuid::new_v4();
        source.upsert(grants(id));

        let resolved = PermissionResolver::new(Arc::new(source)).resolve(id).await.unwrap();
        assert_eq!(resolved.roles, vec!["organizer", "viewer"]);
        assert_eq!(resolved.permissions, vec!["events:read", "events:write"]);
    }

    #[tokio::test]
    async fn test_super_admin_gets_wildcard() {
        let source = MemoryGrantSource::new();
        let id = Uuid::new_v4();
        source.upsert(UserGrants {
            is_super_admin: true,
            ..grants(id)
        });

        let resolved = PermissionResolver::new(Arc::new(source)).resolve(id).await.unwrap();
        assert_eq!(resolved.permissions, vec!["*:*"]);
        assert_eq!(resolved.roles, vec!["organizer", "viewer"]);
    }

    #[tokio::test]
    async fn test_inactive_and_unknown_users_rejected() {
        let source = MemoryGrantSource::new();
        let id = Uuid::new_v4();
        source.upsert(UserGrants {
            is_active: false,
            ..grants(id)
        });
        let resolver = PermissionResolver::new(Arc::new(source));

        let err = resolver.resolve(id).await.unwrap_err();
        assert_eq!(err.code, "ACCOUNT_DISABLED");

        let err = resolver.resolve(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, comhub_core::ErrorKind::Unauthorized);
    }
}
