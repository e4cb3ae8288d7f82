//! Registration workflow status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a registration stands in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RegistrationStatus {
    /// Whether an organizer may still approve or reject.
    pub fn is_decidable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the registration still holds (or may hold) a seat.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = comhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(comhub_core::AppError::invalid_field(
                "status",
                format!("Invalid registration status '{s}'. Expected one of: pending, approved, rejected, cancelled"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_decidable() {
        assert!(RegistrationStatus::Pending.is_decidable());
        assert!(!RegistrationStatus::Approved.is_decidable());
        assert!(!RegistrationStatus::Cancelled.is_decidable());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "Approved".parse::<RegistrationStatus>().unwrap(),
            RegistrationStatus::Approved
        );
        assert!("maybe".parse::<RegistrationStatus>().is_err());
    }
}
