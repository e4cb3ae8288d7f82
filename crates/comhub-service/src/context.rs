//! Request context carrying the authenticated caller and their capabilities.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use comhub_auth::capability::CapabilitySet;
use comhub_auth::jwt::Claims;
use comhub_auth::token::ClientInfo;
use comhub_core::error::AppError;

/// Context for the current authenticated request.
///
/// Built by the auth middleware from validated access-token claims and
/// passed into service methods so that every operation knows who is
/// acting and what they may do.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Email from the token.
    pub email: String,
    /// Role names from the token snapshot.
    pub roles: Vec<String>,
    /// Capabilities from the token snapshot.
    pub capabilities: CapabilitySet,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn from_claims(claims: &Claims, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            user_id: claims.user_id(),
            email: claims.email.clone(),
            roles: claims.roles.clone(),
            capabilities: claims.capabilities(),
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Fail with `Forbidden` unless the caller holds `capability`.
    pub fn require(&self, capability: &str) -> Result<(), AppError> {
        self.capabilities.require(capability)
    }

    pub fn is_super_admin(&self) -> bool {
        self.capabilities.is_super_admin()
    }

    /// Client metadata for refresh-token records.
    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            user_agent: self.user_agent.clone(),
            ip_address: self.ip_address.clone(),
        }
    }

    /// A context for tests and tooling.
    pub fn system(user_id: Uuid, permissions: &[&str], super_admin: bool) -> Self {
        Self {
            user_id,
            email: String::new(),
            roles: Vec::new(),
            capabilities: CapabilitySet::new(
                permissions.iter().map(|p| p.to_string()).collect(),
                super_admin,
            ),
            ip_address: None,
            user_agent: None,
            request_time: Utc::now(),
        }
    }
}
