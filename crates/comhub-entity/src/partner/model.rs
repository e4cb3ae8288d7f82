//! Partner entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::tier::PartnerTier;

/// A sponsoring or partner organisation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Partner {
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: PartnerTier,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreatePartner {
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: PartnerTier,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePartner {
    pub name: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<PartnerTier>,
    pub is_active: Option<bool>,
}
