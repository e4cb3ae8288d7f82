//! Mentor entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A community mentor profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mentor {
    pub id: Uuid,
    pub full_name: String,
    /// Unique contact email, lower-cased.
    pub email: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub expertise: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateMentor {
    pub full_name: String,
    pub email: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub expertise: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMentor {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
