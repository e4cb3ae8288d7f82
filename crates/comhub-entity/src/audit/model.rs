//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable audit log entry recording an administrative action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The user who performed the action (`None` for system jobs).
    pub actor_id: Option<Uuid>,
    /// The action performed (e.g., `"user.roles.replace"`, `"registration.approve"`).
    pub action: String,
    /// The type of target resource (e.g., `"user"`, `"registration"`).
    pub target_type: String,
    /// The target resource ID (if applicable).
    pub target_id: Option<Uuid>,
    /// Additional details about the action (JSON).
    pub details: Option<serde_json::Value>,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLogEntry {
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

impl CreateAuditLogEntry {
    /// Start an entry for `action` on `target_type`/`target_id`.
    pub fn new(
        actor_id: Option<Uuid>,
        action: impl Into<String>,
        target_type: impl Into<String>,
        target_id: Option<Uuid>,
    ) -> Self {
        Self {
            actor_id,
            action: action.into(),
            target_type: target_type.into(),
            target_id,
            details: None,
            ip_address: None,
        }
    }

    /// Attach JSON details.
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the actor's IP address.
    pub fn ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}
