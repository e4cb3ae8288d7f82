//! Advisory distributed lock over the cache backend.
//!
//! A lock is a single key written with `SET NX` plus a TTL. The value is a
//! random owner token; release deletes the key only while it still holds
//! that token, so an owner whose lock expired can never release a lock
//! that has since been taken by someone else.
//!
//! Acquisition fails fast: a held lock yields a `Conflict` error with code
//! `RESOURCE_BUSY` rather than waiting.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::traits::cache::CacheProvider;

use crate::provider::CacheManager;

/// Proof of lock ownership returned by [`DistributedLock::try_acquire`].
#[derive(Debug)]
#[must_use = "a lock guard must be released"]
pub struct LockGuard {
    key: String,
    token: String,
}

impl LockGuard {
    /// Full cache key of the held lock.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Advisory lock manager.
#[derive(Debug, Clone)]
pub struct DistributedLock {
    cache: CacheManager,
    prefix: String,
}

impl DistributedLock {
    /// Create a lock manager whose keys are namespaced under `prefix`.
    pub fn new(cache: CacheManager, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Try to take the lock once. `Ok(None)` means someone else holds it.
    pub async fn try_acquire(&self, key: &str, ttl: Duration) -> AppResult<Option<LockGuard>> {
        let full_key = self.full_key(key);
        let token = Uuid::new_v4().to_string();

        if self.cache.set_nx(&full_key, &token, ttl).await? {
            debug!(key = %full_key, ttl_ms = ttl.as_millis() as u64, "Lock acquired");
            Ok(Some(LockGuard {
                key: full_key,
                token,
            }))
        } else {
            debug!(key = %full_key, "Lock busy");
            Ok(None)
        }
    }

    /// Release a held lock. Returns `false` if the lock had already expired
    /// or now belongs to another owner.
    pub async fn release(&self, guard: LockGuard) -> AppResult<bool> {
        let released = self
            .cache
            .compare_and_delete(&guard.key, &guard.token)
            .await?;
        if !released {
            warn!(key = %guard.key, "Lock expired before release");
        }
        Ok(released)
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// The lock is released after `f` completes, whether it succeeded or
    /// not. A release failure is logged and does not replace `f`'s result;
    /// the TTL bounds how long a stuck lock can live.
    pub async fn with_lock<T, F, Fut>(&self, key: &str, ttl: Duration, f: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let guard = self.try_acquire(key, ttl).await?.ok_or_else(|| {
            AppError::conflict("Resource is busy, retry shortly").with_code("RESOURCE_BUSY")
        })?;

        let key = guard.key.clone();
        let result = f().await;

        if let Err(e) = self.release(guard).await {
            warn!(key = %key, error = %e, "Failed to release lock");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use comhub_core::error::ErrorKind;

    use super::*;

    fn make_lock() -> DistributedLock {
        DistributedLock::new(CacheManager::in_memory(), "lock:")
    }

    #[tokio::test]
    async fn test_with_lock_returns_value_and_releases() {
        let lock = make_lock();
        let value = lock
            .with_lock("k", Duration::from_secs(5), || async { Ok(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);

        // Released: can be taken again immediately.
        let guard = lock.try_acquire("k", Duration::from_secs(5)).await.unwrap();
        assert!(guard.is_some());
    }

    #[tokio::test]
    async fn test_held_lock_fails_fast_with_resource_busy() {
        let lock = make_lock();
        let _guard = lock
            .try_acquire("event:1", Duration::from_secs(5))
            .await
            .unwrap()
            .unwrap();

        let ran = AtomicUsize::new(0);
        let err = lock
            .with_lock("event:1", Duration::from_secs(5), || async {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.code, "RESOURCE_BUSY");
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lock_released_when_closure_fails() {
        let lock = make_lock();
        let err = lock
            .with_lock::<(), _, _>("k", Duration::from_secs(5), || async {
                Err(AppError::validation("nope"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        assert!(lock.try_acquire("k", Duration::from_secs(5)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_owner_cannot_release_new_owner() {
        let lock = make_lock();
        let stale = lock
            .try_acquire("k", Duration::from_millis(50))
            .await
            .unwrap()
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        let fresh = lock
            .try_acquire("k", Duration::from_secs(5))
            .await
            .unwrap()
            .unwrap();

        assert!(!lock.release(stale).await.unwrap());
        assert!(lock.try_acquire("k", Duration::from_secs(5)).await.unwrap().is_none());
        assert!(lock.release(fresh).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_holders_are_mutually_exclusive() {
        let lock = make_lock();
        let inside = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let successes = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let lock = lock.clone();
            let inside = inside.clone();
            let overlaps = overlaps.clone();
            let successes = successes.clone();
            handles.push(tokio::spawn(async move {
                let _ = lock
                    .with_lock("shared", Duration::from_secs(5), || async {
                        if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        inside.fetch_sub(1, Ordering::SeqCst);
                        successes.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert!(successes.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_held_lock_survives_cache_pressure() {
        let config = comhub_core::config::cache::MemoryCacheConfig { max_capacity: 100 };
        let cache = CacheManager::from_provider(Arc::new(
            crate::memory::MemoryCacheProvider::new(&config),
        ));
        let lock = DistributedLock::new(cache.clone(), "");
        let held = lock
            .try_acquire("registration:e:x", Duration::from_secs(60))
            .await
            .unwrap()
            .unwrap();

        for i in 0..2000 {
            let key = format!("denylist:{i}");
            cache.set(&key, "1", Duration::from_secs(60)).await.unwrap();
            cache.get(&key).await.unwrap();
        }

        assert!(
            lock.try_acquire("registration:e:x", Duration::from_secs(60))
                .await
                .unwrap()
                .is_none()
        );
        assert!(lock.release(held).await.unwrap());
    }
}
