//! Password policy enforcement for new passwords.

use comhub_core::config::auth::AuthConfig;
use comhub_core::error::AppError;

/// Validates password strength against the configured policy.
///
/// All violations are reported together under the given field name.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
}

impl PasswordValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validate `password` as the value of `field`.
    pub fn validate(&self, field: &str, password: &str) -> Result<(), AppError> {
        let mut problems = Vec::new();

        if password.chars().count() < self.min_length {
            problems.push(format!(
                "must be at least {} characters long",
                self.min_length
            ));
        }
        if !password.chars().any(char::is_uppercase) {
            problems.push("must contain an uppercase letter".to_string());
        }
        if !password.chars().any(char::is_lowercase) {
            problems.push("must contain a lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("must contain a digit".to_string());
        }
        if problems.is_empty() && zxcvbn::zxcvbn(password, &[]).score() < zxcvbn::Score::Three {
            problems.push("is too easy to guess".to_string());
        }

        if problems.is_empty() {
            return Ok(());
        }
        Err(
            AppError::validation(format!("Password {}", problems.join(", ")))
                .with_details(serde_json::json!({ field: problems })),
        )
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::invalid_field(
                "new_password",
                "must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(validator().validate("password", "Harbour-Lantern-73-Quill").is_ok());
    }

    #[test]
    fn test_all_problems_reported() {
        let err = validator().validate("password", "abc").unwrap_err();
        assert_eq!(err.kind, comhub_core::ErrorKind::Validation);

        let problems = err.details.unwrap()["password"].as_array().unwrap().len();
        assert_eq!(problems, 3);
    }

    #[test]
    fn test_guessable_password_rejected() {
        let err = validator().validate("password", "Password1").unwrap_err();
        assert!(err.message.contains("too easy to guess"));
    }

    #[test]
    fn test_same_password_rejected() {
        assert!(validator().validate_not_same("A", "A").is_err());
        assert!(validator().validate_not_same("A", "B").is_ok());
    }
}
