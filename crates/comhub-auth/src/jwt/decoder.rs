//! JWT access-token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use comhub_core::config::auth::AuthConfig;
use comhub_core::error::AppError;

use super::claims::Claims;

/// Validates access-token signature, expiry and issuer.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock skew
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate an access token.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired").with_code("TOKEN_EXPIRED")
                }
                JwtErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid token signature").with_code("INVALID_TOKEN")
                }
                JwtErrorKind::InvalidIssuer => {
                    AppError::unauthorized("Invalid token issuer").with_code("INVALID_TOKEN")
                }
                _ => AppError::unauthorized("Invalid token").with_code("INVALID_TOKEN"),
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use comhub_core::traits::grants::UserGrants;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-with-enough-entropy-0123456789".into(),
            ..AuthConfig::default()
        }
    }

    fn grants() -> UserGrants {
        UserGrants {
            user_id: Uuid::new_v4(),
            email: "organizer@example.org".into(),
            is_active: true,
            is_super_admin: false,
            roles: vec!["organizer".into()],
            permissions: vec!["events:read".into(), "events:write".into()],
        }
    }

    #[test]
    fn test_encode_decode_carries_snapshot() {
        let config = config();
        let grants = grants();
        let token = JwtEncoder::new(&config).encode(&grants, Utc::now()).unwrap();

        let claims = JwtDecoder::new(&config).decode(&token.token).unwrap();
        assert_eq!(claims.sub, grants.user_id);
        assert_eq!(claims.email, grants.email);
        assert_eq!(claims.roles, vec!["organizer"]);
        assert_eq!(claims.perms, vec!["events:read", "events:write"]);
        assert!(!claims.sa);
        assert_eq!(claims.jti, token.jti);
        assert_eq!(claims.iss, "comhub");
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = config();
        let issued = Utc::now() - Duration::hours(2);
        let token = JwtEncoder::new(&config).encode(&grants(), issued).unwrap();

        let err = JwtDecoder::new(&config).decode(&token.token).unwrap_err();
        assert_eq!(err.code, "TOKEN_EXPIRED");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtEncoder::new(&config()).encode(&grants(), Utc::now()).unwrap();
        let other = AuthConfig {
            jwt_secret: "another-secret-entirely-0123456789abcdef".into(),
            ..AuthConfig::default()
        };
        let err = JwtDecoder::new(&other).decode(&token.token).unwrap_err();
        assert_eq!(err.kind.status_code(), 401);
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut foreign = config();
        foreign.jwt_issuer = "someone-else".into();
        let token = JwtEncoder::new(&foreign).encode(&grants(), Utc::now()).unwrap();

        assert!(JwtDecoder::new(&config()).decode(&token.token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let err = JwtDecoder::new(&config()).decode("not.a.jwt").unwrap_err();
        assert_eq!(err.code, "INVALID_TOKEN");
    }
}
