//! Refresh-token lifecycle: generation, rotation, revocation and sweeping.

pub mod opaque;
pub mod service;
pub mod sweeper;

pub use opaque::RefreshTokenHasher;
pub use service::{ClientInfo, IssuedTokens, TokenService};
pub use sweeper::TokenSweeper;
