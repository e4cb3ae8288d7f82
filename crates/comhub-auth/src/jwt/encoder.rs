//! JWT access-token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use comhub_core::config::auth::AuthConfig;
use comhub_core::error::AppError;
use comhub_core::traits::grants::UserGrants;

use super::claims::Claims;

/// A signed access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Compact JWS.
    pub token: String,
    /// Token ID.
    pub jti: Uuid,
    /// Expiration.
    pub expires_at: DateTime<Utc>,
}

/// Creates signed HS256 access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer written into every token.
    issuer: String,
    /// Access token lifetime.
    access_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            access_ttl: Duration::minutes(config.access_ttl_minutes as i64),
        }
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Sign an access token carrying the given grant snapshot.
    pub fn encode(&self, grants: &UserGrants, now: DateTime<Utc>) -> Result<AccessToken, AppError> {
        let expires_at = now + self.access_ttl;
        let claims = Claims {
            sub: grants.user_id,
            email: grants.email.clone(),
            roles: grants.roles.clone(),
            perms: grants.permissions.clone(),
            sa: grants.is_super_admin,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(AccessToken {
            token,
            jti: claims.jti,
            expires_at,
        })
    }
}
