//! Input checks shared by several services.

use chrono::{DateTime, Utc};

use comhub_core::error::AppError;

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Slugs are lower-case ASCII words joined by single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    let valid = !slug.is_empty()
        && slug.len() <= 120
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_field(
            "slug",
            "must be lower-case letters, digits and single hyphens",
        ))
    }
}

/// An event must end after it starts.
pub fn validate_schedule(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<(), AppError> {
    if ends_at <= starts_at {
        return Err(AppError::invalid_field("ends_at", "must be after starts_at"));
    }
    Ok(())
}

/// Capacity, when set, must be positive.
pub fn validate_capacity(capacity: Option<i32>) -> Result<(), AppError> {
    match capacity {
        Some(c) if c <= 0 => Err(AppError::invalid_field("capacity", "must be greater than zero")),
        _ => Ok(()),
    }
}

/// Trim entries, drop blanks, and de-duplicate case-insensitively keeping
/// first spelling.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.ORG "), "ana@example.org");
    }

    #[test]
    fn test_slugs() {
        assert!(validate_slug("rust-meetup-2025").is_ok());
        for bad in ["", "-a", "a-", "a--b", "Rust", "a b", "ä"] {
            assert!(validate_slug(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_schedule() {
        let now = Utc::now();
        assert!(validate_schedule(now, now + Duration::hours(1)).is_ok());
        let err = validate_schedule(now, now).unwrap_err();
        assert_eq!(err.details.unwrap()["ends_at"][0], "must be after starts_at");
    }

    #[test]
    fn test_capacity() {
        assert!(validate_capacity(None).is_ok());
        assert!(validate_capacity(Some(10)).is_ok());
        assert!(validate_capacity(Some(0)).is_err());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![" Rust ".into(), "rust".into(), "".into(), "Go".into()];
        assert_eq!(normalize_tags(tags), vec!["Rust", "Go"]);
    }
}
