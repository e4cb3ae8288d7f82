//! Registration entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::RegistrationStatus;

/// A person's registration for an event.
///
/// `(event_id, email)` is the natural key; `email` is stored lower-cased.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub full_name: String,
    /// Linked account, when the registrant was logged in.
    pub user_id: Option<Uuid>,
    pub status: RegistrationStatus,
    pub note: Option<String>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a registration.
#[derive(Debug, Clone)]
pub struct CreateRegistration {
    pub event_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub user_id: Option<Uuid>,
    pub note: Option<String>,
    pub status: RegistrationStatus,
}
