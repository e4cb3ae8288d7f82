//! Repository implementations for all ComHub entities.

pub mod audit;
pub mod event;
pub mod mentor;
pub mod partner;
pub mod refresh_token;
pub mod registration;
pub mod roadmap;
pub mod role;
pub mod user;

pub use audit::{AuditFilter, AuditLogRepository};
pub use event::{EVENT_SORT, EventFilter, EventRepository};
pub use mentor::{MENTOR_SORT, MentorFilter, MentorRepository};
pub use partner::{PARTNER_SORT, PartnerFilter, PartnerRepository};
pub use refresh_token::RefreshTokenRepository;
pub use registration::{REGISTRATION_SORT, RegistrationFilter, RegistrationRepository};
pub use roadmap::{ROADMAP_SORT, RoadmapFilter, RoadmapRepository};
pub use role::RoleRepository;
pub use user::{RoleGrant, USER_SORT, UserFilter, UserRepository};
