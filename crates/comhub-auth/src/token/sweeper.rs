//! Periodic deletion of long-expired refresh tokens.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use comhub_core::config::auth::AuthConfig;
use comhub_core::result::AppResult;
use comhub_core::traits::token_store::RefreshTokenStore;

/// Deletes refresh tokens that expired more than `retention` ago.
#[derive(Clone)]
pub struct TokenSweeper {
    store: Arc<dyn RefreshTokenStore>,
    retention: Duration,
    interval: StdDuration,
}

impl std::fmt::Debug for TokenSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSweeper")
            .field("retention", &self.retention)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl TokenSweeper {
    pub fn new(config: &AuthConfig, store: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            store,
            retention: Duration::days(config.refresh_retention_days as i64),
            interval: StdDuration::from_secs(config.sweep_interval_seconds.max(1)),
        }
    }

    /// Run one sweep. Returns the number of deleted tokens.
    pub async fn run_once(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - self.retention;
        let deleted = self.store.delete_expired(cutoff).await?;
        if deleted > 0 {
            info!(deleted, cutoff = %cutoff, "Swept expired refresh tokens");
        }
        Ok(deleted)
    }

    /// Spawn the periodic sweep; it stops when `shutdown` flips to `true`.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(interval_secs = self.interval.as_secs(), "Token sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(error = %e, "Token sweep failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Token sweeper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use comhub_core::traits::token_store::NewRefreshToken;

    use super::*;
    use crate::memory::MemoryRefreshTokenStore;

    async fn insert(store: &MemoryRefreshTokenStore, expired_days_ago: i64) {
        let expires_at = Utc::now() - Duration::days(expired_days_ago);
        store
            .insert(NewRefreshToken {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                family_id: Uuid::new_v4(),
                token_hash: Uuid::new_v4().to_string(),
                issued_at: expires_at - Duration::days(30),
                expires_at,
                user_agent: None,
                ip_address: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_only_tokens_past_retention_are_deleted() {
        let store = MemoryRefreshTokenStore::new();
        insert(&store, 10).await;
        insert(&store, 3).await;
        insert(&store, -5).await;

        let sweeper = TokenSweeper::new(&AuthConfig::default(), Arc::new(store.clone()));
        assert_eq!(sweeper.run_once().await.unwrap(), 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_spawned_sweeper_stops_on_shutdown() {
        let store = MemoryRefreshTokenStore::new();
        insert(&store, 30).await;
        let sweeper = TokenSweeper::new(&AuthConfig::default(), Arc::new(store.clone()));

        let (tx, rx) = watch::channel(false);
        let handle = sweeper.spawn(rx);

        // the first tick fires immediately
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert!(store.is_empty().await);

        tx.send(true).unwrap();
        tokio::time::timeout(StdDuration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
