//! Redis connection management.

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use comhub_core::config::cache::RedisCacheConfig;
use comhub_core::config::redact_url;
use comhub_core::error::AppError;
use comhub_core::result::AppResult;

/// Reconnecting Redis connection scoped to one key namespace.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    key_prefix: String,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Connects eagerly so a bad URL or unreachable server fails at startup.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        info!(url = %redact_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::internal(format!("Invalid Redis URL: {e}")).with_code("CONFIGURATION_ERROR")
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::unavailable(format!("Failed to connect to Redis: {e}"))
        })?;

        info!(key_prefix = %config.key_prefix, "Connected to Redis");
        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Connection handle for one command; clones share the multiplexed link.
    pub fn conn_mut(&self) -> ConnectionManager {
        self.conn.clone()
    }

    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}
