//! Role and permission resolution for token issuance.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Everything an access token needs to know about a user, resolved at the
/// moment of issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGrants {
    pub user_id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_super_admin: bool,
    /// Names of roles whose assignment has not expired.
    pub roles: Vec<String>,
    /// Distinct permission names granted through those roles.
    pub permissions: Vec<String>,
}

/// Source of current role/permission grants.
#[async_trait]
pub trait GrantSource: Send + Sync + 'static {
    /// Load the user's current grants, or `None` if the user does not exist.
    async fn load_grants(&self, user_id: Uuid) -> AppResult<Option<UserGrants>>;
}
