//! Role and permission entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named bundle of permissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    /// Unique role name.
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `resource:action` capability.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    /// Unique name, e.g. `events:write`.
    pub name: String,
    pub description: Option<String>,
}

/// A role together with its permission names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<String>,
}

/// A role granted to a user, possibly time-limited.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleAssignment {
    pub role_id: Uuid,
    pub role_name: String,
    pub granted_by: Option<Uuid>,
    pub granted_at: DateTime<Utc>,
    /// The grant is ignored after this instant.
    pub expires_at: Option<DateTime<Utc>>,
}

impl RoleAssignment {
    /// Whether the grant is in effect at `now`.
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_assignment_expiry() {
        let now = Utc::now();
        let mut grant = RoleAssignment {
            role_id: Uuid::new_v4(),
            role_name: "organizer".into(),
            granted_by: None,
            granted_at: now - Duration::days(1),
            expires_at: None,
        };
        assert!(grant.is_effective(now));

        grant.expires_at = Some(now - Duration::seconds(1));
        assert!(!grant.is_effective(now));

        grant.expires_at = Some(now + Duration::hours(1));
        assert!(grant.is_effective(now));
    }
}
