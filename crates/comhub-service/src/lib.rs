//! # comhub-service
//!
//! Business logic service layer for ComHub. Each service orchestrates
//! repositories, the distributed lock and the auth subsystem to implement
//! one group of use cases, and checks the caller's capabilities before
//! touching any data.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod audit;
pub mod auth;
pub mod community;
pub mod context;
pub mod event;
pub mod rbac;
pub mod user;
pub mod validation;

pub use audit::AuditService;
pub use auth::AuthService;
pub use community::{MentorService, PartnerService, RoadmapService};
pub use context::RequestContext;
pub use event::{EventService, RegistrationService};
pub use rbac::RoleService;
pub use user::AdminUserService;
