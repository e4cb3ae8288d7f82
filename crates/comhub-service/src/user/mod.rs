//! Administrative user management.

pub mod admin;

pub use admin::{AdminUserService, CreateUserRequest, RoleGrantRequest, UpdateUserRequest, UserDetail};
