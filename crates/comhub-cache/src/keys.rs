//! Cache key builders for all ComHub cache entries.
//!
//! The backend adds the configured global prefix; these builders only
//! namespace within it.

use uuid::Uuid;

// ── Lock keys ──────────────────────────────────────────────

/// Lock guarding registration of `email` for an event.
pub fn registration_lock(event_id: Uuid, email: &str) -> String {
    format!("registration:{event_id}:{}", email.trim().to_lowercase())
}

/// Lock guarding mutations of one mentor.
pub fn mentor_lock(mentor_id: Uuid) -> String {
    format!("mentor:{mentor_id}")
}

/// Lock guarding creation of a mentor with `email`.
pub fn mentor_email_lock(email: &str) -> String {
    format!("mentor:email:{}", email.trim().to_lowercase())
}

// ── Token keys ─────────────────────────────────────────────

/// Denylist entry for a logged-out access token, by `jti`.
pub fn revoked_access_token(jti: &str) -> String {
    format!("jwt:revoked:{jti}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_lock_normalises_email() {
        let id = Uuid::nil();
        assert_eq!(
            registration_lock(id, "  Ana@Example.ORG "),
            "registration:00000000-0000-0000-0000-000000000000:ana@example.org"
        );
    }

    #[test]
    fn test_mentor_keys_do_not_collide() {
        let id = Uuid::nil();
        assert_ne!(mentor_lock(id), mentor_email_lock(&id.to_string()));
    }
}
