//! Authentication use cases: login, refresh, logout, profile, password change.

pub mod service;

pub use service::{AuthService, LoginResult, Profile};
