//! Event lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publication state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Being prepared, invisible to the public.
    Draft,
    /// Visible and open for registration.
    Published,
    /// Called off; still visible, closed for registration.
    Cancelled,
    /// Past event kept for records.
    Archived,
}

impl EventStatus {
    /// Whether the event appears in public listings.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Published | Self::Cancelled)
    }

    /// Whether new registrations are accepted.
    pub fn accepts_registrations(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, next),
            (Draft, Published)
                | (Draft, Cancelled)
                | (Published, Cancelled)
                | (Published, Archived)
                | (Cancelled, Archived)
                | (Published, Draft)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Cancelled => "cancelled",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = comhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "cancelled" => Ok(Self::Cancelled),
            "archived" => Ok(Self::Archived),
            _ => Err(comhub_core::AppError::invalid_field(
                "status",
                format!("Invalid event status '{s}'. Expected one of: draft, published, cancelled, archived"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(EventStatus::Draft.can_transition_to(EventStatus::Published));
        assert!(EventStatus::Published.can_transition_to(EventStatus::Cancelled));
        assert!(!EventStatus::Archived.can_transition_to(EventStatus::Published));
        assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Published));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("PUBLISHED".parse::<EventStatus>().unwrap(), EventStatus::Published);
        assert!("live".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_registration_window() {
        assert!(EventStatus::Published.accepts_registrations());
        assert!(!EventStatus::Draft.accepts_registrations());
        assert!(!EventStatus::Cancelled.accepts_registrations());
    }
}
