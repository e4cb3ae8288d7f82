//! Roles, permissions and role assignments.

pub mod model;

pub use model::{Permission, Role, RoleAssignment, RoleWithPermissions};
