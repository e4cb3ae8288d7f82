//! Token service: login issuance, refresh rotation, logout and revocation.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use comhub_cache::CacheManager;
use comhub_cache::keys;
use comhub_core::config::auth::AuthConfig;
use comhub_core::error::{AppError, ErrorKind};
use comhub_core::result::AppResult;
use comhub_core::traits::cache::CacheProvider;
use comhub_core::traits::grants::UserGrants;
use comhub_core::traits::token_store::{
    NewRefreshToken, RefreshTokenRecord, RefreshTokenStore, RotationOutcome,
};

use super::opaque::{self, RefreshTokenHasher};
use crate::jwt::{AccessToken, Claims, JwtDecoder, JwtEncoder};
use crate::resolver::PermissionResolver;

/// Client metadata recorded with each refresh token.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Access + refresh token pair returned to the client exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedTokens {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
    /// Grant snapshot embedded in the access token.
    #[serde(skip)]
    pub grants: UserGrants,
}

/// Issues, rotates and revokes tokens.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn RefreshTokenStore>,
    resolver: PermissionResolver,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    hasher: RefreshTokenHasher,
    cache: CacheManager,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("encoder", &self.encoder)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn RefreshTokenStore>,
        resolver: PermissionResolver,
        cache: CacheManager,
    ) -> Self {
        Self {
            store,
            resolver,
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            hasher: RefreshTokenHasher::new(config.refresh_token_pepper.clone()),
            cache,
            refresh_ttl: Duration::days(config.refresh_ttl_days as i64),
        }
    }

    /// Start a new login session for `user_id`.
    ///
    /// Credentials must already have been verified by the caller.
    pub async fn issue(&self, user_id: Uuid, client: ClientInfo) -> AppResult<IssuedTokens> {
        let grants = self.resolver.resolve(user_id).await?;
        let now = Utc::now();
        let raw = opaque::generate();

        let record = self
            .store
            .insert(self.new_record(user_id, Uuid::new_v4(), &raw, now, client))
            .await?;

        info!(user_id = %user_id, family_id = %record.family_id, "Issued new token family");
        self.assemble(grants, raw, record.expires_at, now)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Grants are resolved and the access token is signed before the
    /// rotation is committed, so a failure on the way leaves the presented
    /// token usable. The presented token is revoked in the same transaction
    /// that stores its successor, so it can be used at most once. Presenting
    /// a token that was already rotated revokes its whole family.
    pub async fn refresh(&self, raw: &str, client: ClientInfo) -> AppResult<IssuedTokens> {
        let now = Utc::now();
        let presented_hash = self.hasher.hash(raw);

        let prepared = match self.store.find_by_hash(&presented_hash).await? {
            Some(record) if record.is_active(now) => {
                let grants = self.grants_for_refresh(&record, now).await?;
                let access = self.encoder.encode(&grants, now)?;
                Some((grants, access))
            }
            // the rotation below reports why the token is unusable
            _ => None,
        };

        let next_raw = opaque::generate();
        // user and family are taken from the presented token by the store
        let successor = self.new_record(Uuid::nil(), Uuid::nil(), &next_raw, now, client);

        let outcome = self.store.rotate(&presented_hash, successor, now).await?;
        let (previous, successor) = match outcome {
            RotationOutcome::Rotated {
                previous,
                successor,
            } => (previous, successor),
            RotationOutcome::Unknown => {
                return Err(invalid_refresh_token());
            }
            RotationOutcome::Expired(_) => {
                return Err(AppError::unauthorized("Refresh token has expired")
                    .with_code("TOKEN_EXPIRED"));
            }
            RotationOutcome::Revoked(record) => {
                if record.replaced_by.is_some() {
                    let revoked = self.store.revoke_family(record.family_id, now).await?;
                    warn!(
                        user_id = %record.user_id,
                        family_id = %record.family_id,
                        revoked,
                        "Rotated refresh token presented again; family revoked"
                    );
                    return Err(AppError::unauthorized("Refresh token was already used")
                        .with_code("TOKEN_REUSED"));
                }
                return Err(AppError::unauthorized("Refresh token has been revoked")
                    .with_code("TOKEN_REVOKED"));
            }
        };

        let Some((grants, access)) = prepared else {
            // the token was not active when looked up but rotated anyway
            self.store.revoke_family(previous.family_id, now).await?;
            return Err(invalid_refresh_token());
        };

        info!(user_id = %previous.user_id, family_id = %previous.family_id, "Refresh token rotated");
        Ok(self.package(grants, access, next_raw, successor.expires_at))
    }

    /// Grants for the owner of an active refresh token. A user who no
    /// longer exists or was deactivated loses the whole family; any other
    /// failure leaves the token untouched.
    async fn grants_for_refresh(
        &self,
        record: &RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> AppResult<UserGrants> {
        match self.resolver.resolve(record.user_id).await {
            Ok(grants) => Ok(grants),
            Err(e) if e.kind == ErrorKind::Unauthorized => {
                let revoked = self.store.revoke_family(record.family_id, now).await?;
                warn!(
                    user_id = %record.user_id,
                    family_id = %record.family_id,
                    revoked,
                    code = e.code,
                    "Refresh refused for inactive account; family revoked"
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// End the session the refresh token belongs to.
    ///
    /// Unknown tokens are ignored. When the caller's access token claims are
    /// given, that token is denylisted for the rest of its lifetime.
    pub async fn logout(&self, raw: &str, access: Option<&Claims>) -> AppResult<()> {
        let now = Utc::now();
        if let Some(record) = self.store.find_by_hash(&self.hasher.hash(raw)).await? {
            let revoked = self.store.revoke_family(record.family_id, now).await?;
            info!(user_id = %record.user_id, family_id = %record.family_id, revoked, "Logged out");
        }
        if let Some(claims) = access {
            self.deny_access_token(claims).await?;
        }
        Ok(())
    }

    /// Revoke every refresh token of a user.
    pub async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self.store.revoke_all_for_user(user_id, Utc::now()).await?;
        info!(user_id = %user_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    /// Validate an access token presented as a bearer credential.
    pub async fn authenticate(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decoder.decode(token)?;

        match self.cache.exists(&keys::revoked_access_token(&claims.jti.to_string())).await {
            Ok(true) => {
                return Err(AppError::unauthorized("Token has been revoked")
                    .with_code("TOKEN_REVOKED"));
            }
            Ok(false) => {}
            // denylist is best-effort; signature and expiry already hold
            Err(e) => warn!(error = %e, "Access-token denylist unavailable"),
        }
        Ok(claims)
    }

    async fn deny_access_token(&self, claims: &Claims) -> AppResult<()> {
        let ttl = claims.remaining_ttl_seconds().max(1);
        self.cache
            .set(
                &keys::revoked_access_token(&claims.jti.to_string()),
                "1",
                StdDuration::from_secs(ttl),
            )
            .await
    }

    fn new_record(
        &self,
        user_id: Uuid,
        family_id: Uuid,
        raw: &str,
        now: DateTime<Utc>,
        client: ClientInfo,
    ) -> NewRefreshToken {
        NewRefreshToken {
            id: Uuid::new_v4(),
            user_id,
            family_id,
            token_hash: self.hasher.hash(raw),
            issued_at: now,
            expires_at: now + self.refresh_ttl,
            user_agent: client.user_agent,
            ip_address: client.ip_address,
        }
    }

    fn assemble(
        &self,
        grants: UserGrants,
        refresh_token: String,
        refresh_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedTokens> {
        let access = self.encoder.encode(&grants, now)?;
        Ok(self.package(grants, access, refresh_token, refresh_expires_at))
    }

    fn package(
        &self,
        grants: UserGrants,
        access: AccessToken,
        refresh_token: String,
        refresh_expires_at: DateTime<Utc>,
    ) -> IssuedTokens {
        IssuedTokens {
            access_token: access.token,
            token_type: "Bearer",
            expires_in: self.encoder.access_ttl().num_seconds(),
            access_expires_at: access.expires_at,
            refresh_token,
            refresh_expires_at,
            grants,
        }
    }
}

fn invalid_refresh_token() -> AppError {
    AppError::unauthorized("Invalid refresh token").with_code("INVALID_TOKEN")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use comhub_core::ErrorKind;
    use comhub_core::traits::grants::GrantSource;
    use comhub_core::traits::token_store::RefreshTokenStore;

    use super::*;
    use crate::memory::{MemoryGrantSource, MemoryRefreshTokenStore};

    struct Fixture {
        service: TokenService,
        store: MemoryRefreshTokenStore,
        grants: MemoryGrantSource,
        user_id: Uuid,
    }

    fn fixture() -> Fixture {
        let config = AuthConfig {
            jwt_secret: "unit-test-secret-0123456789abcdef0123".into(),
            ..AuthConfig::default()
        };
        let store = MemoryRefreshTokenStore::new();
        let grants = MemoryGrantSource::new();
        let user_id = Uuid::new_v4();
        grants.upsert(UserGrants {
            user_id,
            email: "member@example.org".into(),
            is_active: true,
            is_super_admin: false,
            roles: vec!["viewer".into()],
            permissions: vec!["events:read".into()],
        });

        let service = TokenService::new(
            &config,
            Arc::new(store.clone()),
            PermissionResolver::new(Arc::new(grants.clone())),
            CacheManager::in_memory(),
        );
        Fixture {
            service,
            store,
            grants,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_issue_returns_verifiable_pair() {
        let fx = fixture();
        let tokens = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();

        let claims = fx.service.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(claims.sub, fx.user_id);
        assert_eq!(claims.perms, vec!["events:read"]);
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 15 * 60);

        // only the hash is stored
        let hashed = RefreshTokenHasher::new(AuthConfig::default().refresh_token_pepper)
            .hash(&tokens.refresh_token);
        let stored = fx.store.find_by_hash(&hashed).await.unwrap().unwrap();
        assert_ne!(stored.token_hash, tokens.refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let fx = fixture();
        let first = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();

        let second = fx
            .service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        let err = fx
            .service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.code, "TOKEN_REUSED");
    }

    #[tokio::test]
    async fn test_replay_revokes_the_family() {
        let fx = fixture();
        let first = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();
        let second = fx
            .service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap();

        assert!(fx.service.refresh(&first.refresh_token, ClientInfo::default()).await.is_err());

        // the legitimate successor is now dead too
        let err = fx
            .service
            .refresh(&second.refresh_token, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, "TOKEN_REVOKED");
    }

    #[tokio::test]
    async fn test_refresh_picks_up_role_changes() {
        let fx = fixture();
        let first = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();
        assert_eq!(first.grants.permissions, vec!["events:read"]);

        fx.grants.update(fx.user_id, |g| {
            g.roles.push("organizer".into());
            g.permissions.push("events:write".into());
        });

        let next = fx
            .service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap();
        let claims = fx.service.authenticate(&next.access_token).await.unwrap();
        assert_eq!(claims.perms, vec!["events:read", "events:write"]);
        assert_eq!(claims.roles, vec!["organizer", "viewer"]);
    }

    #[tokio::test]
    async fn test_unknown_and_expired_tokens_rejected() {
        let fx = fixture();
        let err = fx
            .service
            .refresh("never-issued", ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_TOKEN");

        let hasher = RefreshTokenHasher::new(AuthConfig::default().refresh_token_pepper);
        let past = Utc::now() - Duration::days(40);
        fx.store
            .insert(NewRefreshToken {
                id: Uuid::new_v4(),
                user_id: fx.user_id,
                family_id: Uuid::new_v4(),
                token_hash: hasher.hash("stale"),
                issued_at: past,
                expires_at: past + Duration::days(30),
                user_agent: None,
                ip_address: None,
            })
            .await
            .unwrap();

        let err = fx.service.refresh("stale", ClientInfo::default()).await.unwrap_err();
        assert_eq!(err.code, "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn test_deactivated_user_cannot_refresh() {
        let fx = fixture();
        let first = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();
        fx.grants.update(fx.user_id, |g| g.is_active = false);

        let err = fx
            .service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, "ACCOUNT_DISABLED");

        // reactivation does not bring the refused session back
        fx.grants.update(fx.user_id, |g| g.is_active = true);
        let err = fx
            .service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, "TOKEN_REVOKED");
    }

    #[tokio::test]
    async fn test_logout_revokes_family_and_access_token() {
        let fx = fixture();
        let tokens = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();
        let claims = fx.service.authenticate(&tokens.access_token).await.unwrap();

        fx.service.logout(&tokens.refresh_token, Some(&claims)).await.unwrap();

        let err = fx
            .service
            .refresh(&tokens.refresh_token, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, "TOKEN_REVOKED");

        let err = fx.service.authenticate(&tokens.access_token).await.unwrap_err();
        assert_eq!(err.code, "TOKEN_REVOKED");

        // logging out twice is harmless
        fx.service.logout(&tokens.refresh_token, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_revoke_all_kills_every_session() {
        let fx = fixture();
        let a = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();
        let b = fx.service.issue(fx.user_id, ClientInfo::default()).await.unwrap();

        assert_eq!(fx.service.revoke_all(fx.user_id).await.unwrap(), 2);
        assert!(fx.service.refresh(&a.refresh_token, ClientInfo::default()).await.is_err());
        assert!(fx.service.refresh(&b.refresh_token, ClientInfo::default()).await.is_err());
    }

    /// Grant source that fails with an internal error while `down` is set.
    struct FlakyGrants {
        inner: MemoryGrantSource,
        down: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl GrantSource for FlakyGrants {
        async fn load_grants(&self, user_id: Uuid) -> AppResult<Option<UserGrants>> {
            if self.down.load(Ordering::SeqCst) {
                return Err(AppError::internal("connection reset by peer"));
            }
            self.inner.load_grants(user_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_presented_token_usable() {
        let fx = fixture();
        let down = Arc::new(AtomicBool::new(false));
        let service = TokenService::new(
            &AuthConfig {
                jwt_secret: "unit-test-secret-0123456789abcdef0123".into(),
                ..AuthConfig::default()
            },
            Arc::new(fx.store.clone()),
            PermissionResolver::new(Arc::new(FlakyGrants {
                inner: fx.grants.clone(),
                down: down.clone(),
            })),
            CacheManager::in_memory(),
        );
        let first = service.issue(fx.user_id, ClientInfo::default()).await.unwrap();

        down.store(true, Ordering::SeqCst);
        let err = service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);

        // nothing was rotated or revoked
        let hashed = RefreshTokenHasher::new(AuthConfig::default().refresh_token_pepper)
            .hash(&first.refresh_token);
        let stored = fx.store.find_by_hash(&hashed).await.unwrap().unwrap();
        assert!(stored.revoked_at.is_none());
        assert_eq!(fx.store.len().await, 1);

        down.store(false, Ordering::SeqCst);
        let next = service
            .refresh(&first.refresh_token, ClientInfo::default())
            .await
            .unwrap();
        assert!(service.authenticate(&next.access_token).await.is_ok());
    }
}
