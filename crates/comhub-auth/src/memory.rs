//! In-process implementations of the refresh-token store and grant source.
//!
//! Suitable for single-node development and tests. State is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use comhub_core::result::AppResult;
use comhub_core::traits::grants::{GrantSource, UserGrants};
use comhub_core::traits::token_store::{
    NewRefreshToken, RefreshTokenRecord, RefreshTokenStore, RotationOutcome,
};

/// Refresh tokens keyed by id, with a hash index.
#[derive(Debug, Default)]
struct TokenState {
    by_id: HashMap<Uuid, RefreshTokenRecord>,
    by_hash: HashMap<String, Uuid>,
}

impl TokenState {
    fn insert(&mut self, token: NewRefreshToken) -> RefreshTokenRecord {
        let record = RefreshTokenRecord {
            id: token.id,
            user_id: token.user_id,
            family_id: token.family_id,
            token_hash: token.token_hash,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            revoked_at: None,
            replaced_by: None,
            user_agent: token.user_agent,
            ip_address: token.ip_address,
        };
        self.by_hash.insert(record.token_hash.clone(), record.id);
        self.by_id.insert(record.id, record.clone());
        record
    }

    fn revoke_where(&mut self, now: DateTime<Utc>, pred: impl Fn(&RefreshTokenRecord) -> bool) -> u64 {
        let mut count = 0;
        for record in self.by_id.values_mut() {
            if record.revoked_at.is_none() && pred(record) {
                record.revoked_at = Some(now);
                count += 1;
            }
        }
        count
    }
}

/// Refresh-token store guarded by a single async mutex.
#[derive(Debug, Clone, Default)]
pub struct MemoryRefreshTokenStore {
    state: Arc<Mutex<TokenState>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, revoked ones included.
    pub async fn len(&self) -> usize {
        self.state.lock().await.by_id.len()
    }

    /// Whether the store holds no tokens.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, token: NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        Ok(self.state.lock().await.insert(token))
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .by_hash
            .get(token_hash)
            .and_then(|id| state.by_id.get(id))
            .cloned())
    }

    async fn rotate(
        &self,
        presented_hash: &str,
        successor: NewRefreshToken,
        now: DateTime<Utc>,
    ) -> AppResult<RotationOutcome> {
        let mut state = self.state.lock().await;

        let Some(current) = state
            .by_hash
            .get(presented_hash)
            .and_then(|id| state.by_id.get(id))
            .cloned()
        else {
            return Ok(RotationOutcome::Unknown);
        };
        if current.revoked_at.is_some() {
            return Ok(RotationOutcome::Revoked(current));
        }
        if current.expires_at <= now {
            return Ok(RotationOutcome::Expired(current));
        }

        let successor = state.insert(NewRefreshToken {
            user_id: current.user_id,
            family_id: current.family_id,
            ..successor
        });

        let previous = RefreshTokenRecord {
            revoked_at: Some(now),
            replaced_by: Some(successor.id),
            ..current
        };
        state.by_id.insert(previous.id, previous.clone());

        Ok(RotationOutcome::Rotated {
            previous,
            successor,
        })
    }

    async fn revoke_family(&self, family_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self
            .state
            .lock()
            .await
            .revoke_where(now, |r| r.family_id == family_id))
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self
            .state
            .lock()
            .await
            .revoke_where(now, |r| r.user_id == user_id))
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let expired: Vec<RefreshTokenRecord> = state
            .by_id
            .values()
            .filter(|r| r.expires_at < cutoff)
            .cloned()
            .collect();
        for record in &expired {
            state.by_id.remove(&record.id);
            state.by_hash.remove(&record.token_hash);
        }
        Ok(expired.len() as u64)
    }
}

/// Grant source backed by a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryGrantSource {
    grants: Arc<DashMap<Uuid, UserGrants>>,
}

impl MemoryGrantSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user's grants.
    pub fn upsert(&self, grants: UserGrants) {
        self.grants.insert(grants.user_id, grants);
    }

    /// Apply `f` to a user's grants in place. Returns `false` if unknown.
    pub fn update(&self, user_id: Uuid, f: impl FnOnce(&mut UserGrants)) -> bool {
        match self.grants.get_mut(&user_id) {
            Some(mut entry) => {
                f(entry.value_mut());
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, user_id: Uuid) {
        self.grants.remove(&user_id);
    }
}

#[async_trait]
impl GrantSource for MemoryGrantSource {
    async fn load_grants(&self, user_id: Uuid) -> AppResult<Option<UserGrants>> {
        Ok(self.grants.get(&user_id).map(|g| g.value().clone()))
    }
}
