//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use comhub_auth::token::TokenService;
use comhub_auth::{PasswordHasher, PasswordValidator, PermissionResolver};
use comhub_cache::{CacheManager, DistributedLock};
use comhub_core::config::AppConfig;
use comhub_core::traits::grants::GrantSource;
use comhub_core::traits::token_store::RefreshTokenStore;
use comhub_database::repositories::{
    AuditLogRepository, EventRepository, MentorRepository, PartnerRepository,
    RegistrationRepository, RoadmapRepository, RoleRepository, UserRepository,
};
use comhub_service::{
    AdminUserService, AuditService, AuthService, EventService, MentorService, PartnerService,
    RegistrationService, RoadmapService, RoleService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool, used by the readiness probe
    pub db_pool: PgPool,
    /// Cache manager (Redis or in-memory)
    pub cache: CacheManager,

    // ── Auth ─────────────────────────────────────────────────
    /// Access-token validation and refresh-token lifecycle
    pub tokens: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,

    // ── Administration ───────────────────────────────────────
    pub admin_user_service: Arc<AdminUserService>,
    pub role_service: Arc<RoleService>,
    pub audit_service: Arc<AuditService>,

    // ── Community ────────────────────────────────────────────
    pub event_service: Arc<EventService>,
    pub registration_service: Arc<RegistrationService>,
    pub mentor_service: Arc<MentorService>,
    pub partner_service: Arc<PartnerService>,
    pub roadmap_service: Arc<RoadmapService>,
}

impl AppState {
    /// Wires repositories, the auth subsystem and every service.
    ///
    /// `token_store` and `grant_source` are the two substitutable seams;
    /// production passes the Postgres repositories.
    pub fn new(
        config: AppConfig,
        db_pool: PgPool,
        cache: CacheManager,
        token_store: Arc<dyn RefreshTokenStore>,
        grant_source: Arc<dyn GrantSource>,
    ) -> Self {
        // ── Repositories ─────────────────────────────────────────
        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let role_repo = Arc::new(RoleRepository::new(db_pool.clone()));
        let audit_repo = Arc::new(AuditLogRepository::new(db_pool.clone()));
        let event_repo = Arc::new(EventRepository::new(db_pool.clone()));
        let registration_repo = Arc::new(RegistrationRepository::new(db_pool.clone()));
        let mentor_repo = Arc::new(MentorRepository::new(db_pool.clone()));
        let partner_repo = Arc::new(PartnerRepository::new(db_pool.clone()));
        let roadmap_repo = Arc::new(RoadmapRepository::new(db_pool.clone()));

        // ── Auth ─────────────────────────────────────────────────
        let hasher = Arc::new(PasswordHasher::new());
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let tokens = Arc::new(TokenService::new(
            &config.auth,
            token_store,
            PermissionResolver::new(grant_source),
            cache.clone(),
        ));
        let lock = Arc::new(DistributedLock::new(
            cache.clone(),
            config.lock.key_prefix.clone(),
        ));

        // ── Services ─────────────────────────────────────────────
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repo),
            Arc::clone(&tokens),
            Arc::clone(&hasher),
            Arc::clone(&validator),
        ));
        let admin_user_service = Arc::new(AdminUserService::new(
            Arc::clone(&user_repo),
            Arc::clone(&audit_repo),
            hasher,
            validator,
        ));
        let role_service = Arc::new(RoleService::new(role_repo, Arc::clone(&audit_repo)));
        let audit_service = Arc::new(AuditService::new(audit_repo));
        let event_service = Arc::new(EventService::new(Arc::clone(&event_repo)));
        let registration_service = Arc::new(RegistrationService::new(
            registration_repo,
            event_repo,
            Arc::clone(&lock),
            &config.lock,
        ));
        let mentor_service = Arc::new(MentorService::new(mentor_repo, lock, &config.lock));
        let partner_service = Arc::new(PartnerService::new(partner_repo));
        let roadmap_service = Arc::new(RoadmapService::new(roadmap_repo));

        Self {
            config: Arc::new(config),
            db_pool,
            cache,
            tokens,
            auth_service,
            admin_user_service,
            role_service,
            audit_service,
            event_service,
            registration_service,
            mentor_service,
            partner_service,
            roadmap_service,
        }
    }
}
