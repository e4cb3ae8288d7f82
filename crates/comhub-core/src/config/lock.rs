//! Distributed lock configuration.

use serde::{Deserialize, Serialize};

/// Advisory lock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Key prefix for lock entries.
    #[serde(default = "default_prefix")]
    pub key_prefix: String,
    /// Lock TTL used by registration submissions, in milliseconds.
    #[serde(default = "default_registration_ttl")]
    pub registration_ttl_ms: u64,
    /// Lock TTL used by mentor mutations, in milliseconds.
    #[serde(default = "default_mentor_ttl")]
    pub mentor_ttl_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_prefix(),
            registration_ttl_ms: default_registration_ttl(),
            mentor_ttl_ms: default_mentor_ttl(),
        }
    }
}

fn default_prefix() -> String {
    "lock:".to_string()
}

fn default_registration_ttl() -> u64 {
    10_000
}

fn default_mentor_ttl() -> u64 {
    5_000
}
