//! HTTP listener and CORS configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are answered with 408.
    pub request_timeout_seconds: u64,
    /// How long shutdown waits for in-flight requests and the token sweeper.
    pub shutdown_grace_seconds: u64,
    /// Larger JSON bodies are rejected with 413.
    pub max_body_bytes: usize,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            request_timeout_seconds: 30,
            shutdown_grace_seconds: 30,
            max_body_bytes: 1024 * 1024,
            cors: CorsConfig::default(),
        }
    }
}

/// Browser origins allowed to call the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact origins such as `https://admin.example.org`. A single `"*"`
    /// allows any origin.
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime.
    pub max_age_seconds: u64,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            max_age_seconds: 600,
        }
    }
}
