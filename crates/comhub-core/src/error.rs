//! Unified application error types for ComHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The [`ErrorKind`] taxonomy is fixed
//! and maps one-to-one onto HTTP status codes at the API boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed request (bad query parameter, unknown sort field, ...).
    BadRequest,
    /// Missing, invalid, expired or revoked credentials.
    Unauthorized,
    /// Authenticated but lacking the required capability.
    Forbidden,
    /// The requested resource was not found.
    NotFound,
    /// Duplicate entry, busy resource or concurrent modification.
    Conflict,
    /// Input validation failed.
    Validation,
    /// An internal server error occurred.
    Internal,
    /// A backing service (cache, lock store) is unreachable.
    Unavailable,
}

impl ErrorKind {
    /// HTTP status code mirrored by this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Validation => 422,
            Self::Internal => 500,
            Self::Unavailable => 503,
        }
    }

    /// Default machine-readable code for this kind.
    pub fn default_code(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Validation => "VALIDATION_FAILED",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Whether the message may be shown to the client verbatim.
    pub fn is_client_visible(&self) -> bool {
        !matches!(self, Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_code())
    }
}

/// The unified application error used throughout ComHub.
///
/// Carries a stable machine-readable `code` (defaults to the kind's code)
/// and optional structured `details`, e.g. the field map of a validation
/// failure.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// A human-readable error message.
    pub message: String,
    /// Optional structured details for the client.
    pub details: Option<Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.default_code(),
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    /// Override the machine-readable code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a single-message validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a validation error for one field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        Self::new(ErrorKind::Validation, message).with_details(serde_json::json!(fields))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Database failures surface as internal errors with their own code.
    pub fn database(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(ErrorKind::Internal, message, source).with_code("DATABASE_ERROR")
    }

    /// Create a service-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// Message safe to return to the client.
    pub fn public_message(&self) -> String {
        if self.kind.is_client_visible() {
            self.message.clone()
        } else {
            "An internal error occurred".to_string()
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            code: self.code,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
        .with_code("SERIALIZATION_ERROR")
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("Configuration error: {err}"),
            err,
        )
        .with_code("CONFIGURATION_ERROR")
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = validation_field_map(&errors);
        let count: usize = fields.values().map(Vec::len).sum();
        Self::new(
            ErrorKind::Validation,
            format!("Request validation failed ({count} problem(s))"),
        )
        .with_details(serde_json::json!(fields))
    }
}

/// Flatten validator errors into `field -> [messages]`, nested fields joined
/// with `.` and list items indexed as `field[i]`.
pub fn validation_field_map(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect_validation_errors("", errors, &mut out);
    out
}

fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(path).or_default();
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", err.code));
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_errors(&path, inner, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "must be a valid email"))]
        email: String,
        #[validate(length(min = 8, message = "too short"))]
        password: String,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::Validation.status_code(), 422);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
        assert_eq!(ErrorKind::Unavailable.status_code(), 503);
    }

    #[test]
    fn test_validation_errors_are_aggregated() {
        let input = Signup {
            email: "nope".into(),
            password: "short".into(),
        };
        let err: AppError = input.validate().unwrap_err().into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.code, "VALIDATION_FAILED");

        let details = err.details.expect("details");
        assert_eq!(details["email"][0], "must be a valid email");
        assert_eq!(details["password"][0], "too short");
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let err = AppError::internal("connection to 10.0.0.3 refused");
        assert_eq!(err.public_message(), "An internal error occurred");

        let err = AppError::conflict("Email already taken");
        assert_eq!(err.public_message(), "Email already taken");
    }

    #[test]
    fn test_code_override() {
        let err = AppError::conflict("busy").with_code("RESOURCE_BUSY");
        assert_eq!(err.code, "RESOURCE_BUSY");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.clone().code, "RESOURCE_BUSY");
    }

    #[test]
    fn test_invalid_field() {
        let err = AppError::invalid_field("sort", "unknown field");
        assert_eq!(err.details.unwrap()["sort"][0], "unknown field");
    }
}
