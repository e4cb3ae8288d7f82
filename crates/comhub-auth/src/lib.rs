//! # comhub-auth
//!
//! Authentication and authorization for ComHub.
//!
//! ## Modules
//!
//! - `jwt`: access-token claims, signing and validation
//! - `password`: Argon2id password hashing and policy enforcement
//! - `capability`: `resource:action` capability matching
//! - `resolver`: role/permission snapshot resolution
//! - `token`: refresh-token generation, rotation, revocation and expiry sweeping
//! - `memory`: in-process refresh-token store and grant source

pub mod capability;
pub mod jwt;
pub mod memory;
pub mod password;
pub mod resolver;
pub mod token;

pub use capability::CapabilitySet;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use resolver::PermissionResolver;
pub use token::{ClientInfo, IssuedTokens, TokenService, TokenSweeper};
