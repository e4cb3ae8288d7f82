//! Core traits defined in `comhub-core` and implemented by other crates.

pub mod cache;
pub mod grants;
pub mod token_store;

pub use cache::CacheProvider;
pub use grants::{GrantSource, UserGrants};
pub use token_store::{NewRefreshToken, RefreshTokenRecord, RefreshTokenStore, RotationOutcome};
