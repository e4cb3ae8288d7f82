//! Cache backend configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which store backs the cache and the distributed locks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local; locks only exclude within one node.
    #[default]
    Memory,
    Redis,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Redis => f.write_str("redis"),
        }
    }
}

/// Top-level cache configuration.
///
/// The same backend stores the distributed locks and the access-token
/// denylist, so multi-node deployments must use `provider = "redis"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub provider: CacheBackend,
    #[serde(default)]
    pub redis: RedisCacheConfig,
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prepended to every key written by this deployment.
    #[serde(default = "default_namespace")]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_namespace(),
        }
    }
}

/// Bounds for the in-process store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_entries(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".into()
}

fn default_namespace() -> String {
    "comhub:".into()
}

fn default_max_entries() -> u64 {
    50_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        let cfg: CacheConfig = serde_json::from_str(r#"{"provider":"redis"}"#).unwrap();
        assert_eq!(cfg.provider, CacheBackend::Redis);
        assert_eq!(cfg.redis.key_prefix, "comhub:");
        assert!(serde_json::from_str::<CacheConfig>(r#"{"provider":"memcached"}"#).is_err());
    }
}
