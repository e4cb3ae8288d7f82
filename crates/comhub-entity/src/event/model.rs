//! Event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::EventStatus;

/// A community event (meetup, workshop, hackathon).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    /// URL-friendly unique identifier.
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Maximum approved registrations; `None` means unlimited.
    pub capacity: Option<i32>,
    pub status: EventStatus,
    /// Registrations start as pending when set.
    pub requires_approval: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether `approved` registrations leave room for one more.
    pub fn has_room(&self, approved: i64) -> bool {
        self.capacity.is_none_or(|cap| approved < i64::from(cap))
    }
}

/// Data required to create an event.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub requires_approval: bool,
    pub created_by: Option<Uuid>,
}

/// Partial update of an event. Status changes go through their own operation.
#[derive(Debug, Clone, Default)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<Option<i32>>,
    pub requires_approval: Option<bool>,
}
