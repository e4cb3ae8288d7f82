//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use comhub_core::config::cache::{CacheBackend, CacheConfig};
use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::traits::cache::CacheProvider;

/// Handle to the configured cache backend, shared by the token denylist
/// and the distributed lock.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider {
            #[cfg(feature = "redis-backend")]
            CacheBackend::Redis => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            CacheBackend::Memory => {
                info!(
                    max_capacity = config.memory.max_capacity,
                    "Initializing in-memory cache provider"
                );
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::internal(format!(
                    "Cache provider '{other}' is not compiled into this build"
                ))
                .with_code("CONFIGURATION_ERROR"));
            }
        };

        Ok(Self { inner })
    }

    /// Wraps an existing provider.
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }

    /// In-process cache manager with default settings.
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        let config = comhub_core::config::cache::MemoryCacheConfig::default();
        Self::from_provider(Arc::new(crate::memory::MemoryCacheProvider::new(&config)))
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        self.inner.compare_and_delete(key, expected).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
