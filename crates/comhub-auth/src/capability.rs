//! Capability matching for `resource:action` permission strings.
//!
//! A granted capability satisfies a requirement when it is equal to it,
//! when it is `resource:*` for the same resource, or when it is `*:*`.

use comhub_core::error::AppError;

/// Wildcard held by super-admins.
pub const ALL: &str = "*:*";

/// Whether one granted capability satisfies `required`.
pub fn grants(granted: &str, required: &str) -> bool {
    if granted == ALL || granted == required {
        return true;
    }
    match (granted.split_once(':'), required.split_once(':')) {
        (Some((g_res, "*")), Some((r_res, _))) => g_res == r_res,
        _ => false,
    }
}

/// The capabilities attached to an authenticated request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    permissions: Vec<String>,
    super_admin: bool,
}

impl CapabilitySet {
    pub fn new(permissions: Vec<String>, super_admin: bool) -> Self {
        Self {
            permissions,
            super_admin,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.super_admin
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Whether `required` is granted.
    pub fn allows(&self, required: &str) -> bool {
        self.super_admin || self.permissions.iter().any(|p| grants(p, required))
    }

    /// Fail with `Forbidden` unless `required` is granted.
    pub fn require(&self, required: &str) -> Result<(), AppError> {
        if self.allows(required) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Missing capability '{required}'"))
                .with_details(serde_json::json!({ "required": required })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(grants("events:write", "events:write"));
        assert!(!grants("events:read", "events:write"));
    }

    #[test]
    fn test_resource_wildcard() {
        assert!(grants("events:*", "events:write"));
        assert!(!grants("events:*", "mentors:write"));
    }

    #[test]
    fn test_global_wildcard() {
        assert!(grants("*:*", "audit:read"));
    }

    #[test]
    fn test_malformed_grants_match_nothing_else() {
        assert!(!grants("events", "events:write"));
        assert!(!grants("*", "events:write"));
        assert!(!grants(":*", "events:write"));
    }

    #[test]
    fn test_require_forbidden() {
        let caps = CapabilitySet::new(vec!["events:read".into()], false);
        assert!(caps.require("events:read").is_ok());

        let err = caps.require("events:write").unwrap_err();
        assert_eq!(err.kind, comhub_core::ErrorKind::Forbidden);
        assert_eq!(err.details.unwrap()["required"], "events:write");
    }

    #[test]
    fn test_super_admin_flag_allows_everything() {
        let caps = CapabilitySet::new(Vec::new(), true);
        assert!(caps.allows("roles:write"));
    }
}
