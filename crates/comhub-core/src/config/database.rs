//! PostgreSQL pool configuration.

use serde::{Deserialize, Serialize};

/// The only section without a usable default: `url` must be supplied by
/// a config file or `COMHUB__DATABASE__URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "pool::max")]
    pub max_connections: u32,
    #[serde(default = "pool::min")]
    pub min_connections: u32,
    /// Upper bound on waiting for a pooled connection.
    #[serde(default = "pool::acquire_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connections above `min_connections` are closed after this long.
    #[serde(default = "pool::idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Whether the server applies pending migrations before listening.
    /// Deployments that migrate with `comhub-cli migrate` turn this off.
    #[serde(default = "pool::migrate_on_start")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: pool::max(),
            min_connections: pool::min(),
            connect_timeout_seconds: pool::acquire_timeout(),
            idle_timeout_seconds: pool::idle_timeout(),
            run_migrations: pool::migrate_on_start(),
        }
    }
}

mod pool {
    pub(super) fn max() -> u32 {
        20
    }

    pub(super) fn min() -> u32 {
        2
    }

    pub(super) fn acquire_timeout() -> u64 {
        5
    }

    pub(super) fn idle_timeout() -> u64 {
        600
    }

    pub(super) fn migrate_on_start() -> bool {
        true
    }
}
