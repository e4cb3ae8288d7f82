//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered platform user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login email, stored lower-cased.
    pub email: String,
    /// Argon2 password hash. `None` for OAuth-only accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Whether the account may authenticate.
    pub is_active: bool,
    /// Super-admins bypass permission checks.
    pub is_super_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the user can log in with a password right now.
    pub fn can_password_login(&self) -> bool {
        self.is_active && self.password_hash.is_some()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (normalised by the caller).
    pub email: String,
    /// Pre-hashed password, if any.
    pub password_hash: Option<String>,
    /// Display name (optional).
    pub display_name: Option<String>,
    /// Whether to grant super-admin.
    pub is_super_admin: bool,
}

/// Partial update of a user's profile and flags.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New display name.
    pub display_name: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New super-admin flag.
    pub is_super_admin: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(password_hash: Option<&str>, is_active: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ana@example.org".into(),
            password_hash: password_hash.map(String::from),
            display_name: None,
            is_active,
            is_super_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_oauth_only_user_cannot_password_login() {
        assert!(!user(None, true).can_password_login());
        assert!(!user(Some("$argon2id$..."), false).can_password_login());
        assert!(user(Some("$argon2id$..."), true).can_password_login());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user(Some("secret-hash"), true)).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
