//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};

use comhub_core::config::cache::MemoryCacheConfig;
use comhub_core::result::AppResult;
use comhub_core::traits::cache::CacheProvider;

/// A cached value together with its own time-to-live.
#[derive(Debug, Clone)]
struct Stored {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Stored> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Stored, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Stored,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache provider using moka.
///
/// `set_nx` and `compare_and_delete` go through moka's per-key compute
/// lock, so they are atomic against each other within the process.
///
/// Keys written with `set_nx` live in a separate cache with no capacity
/// bound. They leave it only by TTL or explicit deletion, never by size
/// eviction, so a held lock survives pressure on the bounded cache.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// Bounded cache for plain `set` entries.
    cache: Cache<String, Stored>,
    /// Unbounded cache for `set_nx` entries.
    exclusive: Cache<String, Stored>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        let exclusive = Cache::builder().expire_after(PerEntryTtl).build();

        Self { cache, exclusive }
    }

    async fn lookup(&self, key: &str) -> Option<Stored> {
        match self.exclusive.get(key).await {
            Some(stored) => Some(stored),
            None => self.cache.get(key).await,
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lookup(key).await.map(|stored| stored.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.exclusive.remove(key).await;
        self.cache
            .insert(
                key.to_string(),
                Stored {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.exclusive.remove(key).await;
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.lookup(key).await.is_some())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        if self.cache.contains_key(key) {
            return Ok(false);
        }

        let stored = Stored {
            value: value.to_string(),
            ttl,
        };
        let result = self
            .exclusive
            .entry(key.to_string())
            .and_compute_with(|current| async move {
                match current {
                    Some(_) => Op::Nop,
                    None => Op::Put(stored),
                }
            })
            .await;

        Ok(matches!(result, CompResult::Inserted(_)))
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let store = if self.exclusive.contains_key(key) {
            &self.exclusive
        } else {
            &self.cache
        };
        let result = store
            .entry(key.to_string())
            .and_compute_with(|current| async move {
                match current {
                    Some(entry) if entry.value().value == expected => Op::Remove,
                    _ => Op::Nop,
                }
            })
            .await;

        Ok(matches!(result, CompResult::Removed(_)))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider.set("key", "v", Duration::from_secs(60)).await.unwrap();
        provider.delete("key").await.unwrap();
        assert!(!provider.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_nx_only_first_wins() {
        let provider = make_provider();
        let ttl = Duration::from_secs(60);
        assert!(provider.set_nx("lock", "a", ttl).await.unwrap());
        assert!(!provider.set_nx("lock", "b", ttl).await.unwrap());
        assert_eq!(provider.get("lock").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_own_ttl() {
        let provider = make_provider();
        provider
            .set("short", "v", Duration::from_millis(50))
            .await
            .unwrap();
        provider.set("long", "v", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(provider.get("short").await.unwrap(), None);
        assert!(provider.exists("long").await.unwrap());
        assert!(provider.set_nx("short", "again", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_compare_and_delete_checks_value() {
        let provider = make_provider();
        provider.set("k", "owner-1", Duration::from_secs(60)).await.unwrap();

        assert!(!provider.compare_and_delete("k", "owner-2").await.unwrap());
        assert!(provider.exists("k").await.unwrap());

        assert!(provider.compare_and_delete("k", "owner-1").await.unwrap());
        assert!(!provider.exists("k").await.unwrap());

        assert!(!provider.compare_and_delete("missing", "x").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_set_nx_has_single_winner() {
        let provider = make_provider();
        let mut handles = Vec::new();
        for i in 0..32 {
            let provider = provider.clone();
            handles.push(tokio::spawn(async move {
                provider
                    .set_nx("race", &i.to_string(), Duration::from_secs(60))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_exclusive_entry_survives_capacity_pressure() {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 100 });
        let ttl = Duration::from_secs(60);
        assert!(provider.set_nx("registration:e:x", "owner", ttl).await.unwrap());

        for i in 0..2000 {
            let key = format!("denylist:{i}");
            provider.set(&key, "1", ttl).await.unwrap();
            provider.get(&key).await.unwrap();
        }
        provider.cache.run_pending_tasks().await;
        provider.exclusive.run_pending_tasks().await;

        assert!(provider.cache.entry_count() <= 100);
        assert_eq!(
            provider.get("registration:e:x").await.unwrap().as_deref(),
            Some("owner")
        );
        assert!(!provider.set_nx("registration:e:x", "intruder", ttl).await.unwrap());
        assert!(provider.compare_and_delete("registration:e:x", "owner").await.unwrap());
        assert!(!provider.exists("registration:e:x").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_nx_refuses_key_written_by_set() {
        let provider = make_provider();
        let ttl = Duration::from_secs(60);
        provider.set("k", "plain", ttl).await.unwrap();
        assert!(!provider.set_nx("k", "other", ttl).await.unwrap());
        assert_eq!(provider.get("k").await.unwrap().as_deref(), Some("plain"));
    }
}
