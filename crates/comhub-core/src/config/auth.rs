//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Token issuance and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// `iss` claim written into and required from access tokens.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Server-side salt mixed into refresh token hashes.
    #[serde(default = "default_pepper")]
    pub refresh_token_pepper: String,
    /// How long expired refresh tokens are retained before the sweep deletes them.
    #[serde(default = "default_retention")]
    pub refresh_retention_days: u64,
    /// Interval between expiry sweeps in seconds (0 disables the background sweep).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Reject the placeholder secret at startup.
    #[serde(default)]
    pub require_strong_secret: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_issuer(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            refresh_token_pepper: default_pepper(),
            refresh_retention_days: default_retention(),
            sweep_interval_seconds: default_sweep_interval(),
            password_min_length: default_password_min(),
            require_strong_secret: false,
        }
    }
}

impl AuthConfig {
    /// Reject obviously unsafe secrets when `require_strong_secret` is set.
    pub fn check(&self) -> Result<(), AppError> {
        if self.require_strong_secret
            && (self.jwt_secret == PLACEHOLDER_SECRET || self.jwt_secret.len() < 32)
        {
            return Err(AppError::internal(
                "auth.jwt_secret must be set to at least 32 characters",
            )
            .with_code("CONFIGURATION_ERROR"));
        }
        Ok(())
    }
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_SECRET.to_string()
}

fn default_issuer() -> String {
    "comhub".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_pepper() -> String {
    "comhub-refresh".to_string()
}

fn default_retention() -> u64 {
    7
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_password_min() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_secret_rejected_when_required() {
        let mut config = AuthConfig {
            require_strong_secret: true,
            ..AuthConfig::default()
        };
        assert!(config.check().is_err());

        config.jwt_secret = "x".repeat(40);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_placeholder_secret_allowed_by_default() {
        assert!(AuthConfig::default().check().is_ok());
    }
}
