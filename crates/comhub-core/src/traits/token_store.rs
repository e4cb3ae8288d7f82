//! Refresh token persistence.
//!
//! Only hashes are ever stored. Rows are soft-revoked (`revoked_at`) and
//! physically removed by the expiry sweep.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::result::AppResult;

/// A persisted refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// All tokens descended from one login share a family.
    pub family_id: Uuid,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    /// Successor token when this one was revoked by rotation.
    pub replaced_by: Option<Uuid>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl RefreshTokenRecord {
    /// Whether the token may still be exchanged at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Data for a token about to be stored.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub family_id: Uuid,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Result of an atomic rotation attempt.
#[derive(Debug, Clone)]
pub enum RotationOutcome {
    /// The presented token was revoked and `successor` inserted.
    Rotated {
        previous: RefreshTokenRecord,
        successor: RefreshTokenRecord,
    },
    /// No token with that hash exists.
    Unknown,
    /// The token exists but has expired.
    Expired(RefreshTokenRecord),
    /// The token exists but was already revoked.
    Revoked(RefreshTokenRecord),
}

/// Storage backend for refresh tokens.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Persist a freshly issued token.
    async fn insert(&self, token: NewRefreshToken) -> AppResult<RefreshTokenRecord>;

    /// Look up a token by hash, whatever its state.
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>>;

    /// Atomically revoke the token identified by `presented_hash` and insert
    /// `successor` in the same family, provided the presented token is
    /// active at `now`. The `user_id` and `family_id` of `successor` are
    /// taken from the presented token.
    async fn rotate(
        &self,
        presented_hash: &str,
        successor: NewRefreshToken,
        now: DateTime<Utc>,
    ) -> AppResult<RotationOutcome>;

    /// Revoke every active token in a family. Returns the number revoked.
    async fn revoke_family(&self, family_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Revoke every active token of a user. Returns the number revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Delete tokens that expired before `cutoff`. Returns the number deleted.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
