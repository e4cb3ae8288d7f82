//! JWT claims structure carried by every access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::CapabilitySet;

/// Claims payload of an access token.
///
/// `roles` and `perms` are a snapshot taken at issuance; they are refreshed
/// every time the refresh token is rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Email at issuance.
    pub email: String,
    /// Active role names.
    pub roles: Vec<String>,
    /// Resolved permission names (`["*:*"]` for super-admins).
    pub perms: Vec<String>,
    /// Super-admin flag.
    #[serde(default)]
    pub sa: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token ID, used by the logout denylist.
    pub jti: Uuid,
    /// Issuer.
    pub iss: String,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Returns the remaining TTL in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }

    /// Capability set granted by this token.
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(self.perms.clone(), self.sa)
    }
}
