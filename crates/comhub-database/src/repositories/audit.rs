//! Audit log repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortDirection;
use comhub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use crate::query::{Conditions, Filter, db_error, fetch_page};

/// Typed audit search filters.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub actor_id: Option<Uuid>,
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Search the audit log, newest first unless `direction` says otherwise.
    pub async fn search(
        &self,
        filter: &AuditFilter,
        direction: SortDirection,
        page: PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let apply = |qb: &mut Filter| {
            let mut cond = Conditions::new(qb);
            if let Some(actor) = filter.actor_id {
                cond.next().push("actor_id = ").push_bind(actor);
            }
            if let Some(action) = &filter.action {
                cond.next().push("action = ").push_bind(action.clone());
            }
            if let Some(target_type) = &filter.target_type {
                cond.next().push("target_type = ").push_bind(target_type.clone());
            }
            if let Some(target_id) = filter.target_id {
                cond.next().push("target_id = ").push_bind(target_id);
            }
            if let Some(from) = filter.from {
                cond.next().push("created_at >= ").push_bind(from);
            }
            if let Some(to) = filter.to {
                cond.next().push("created_at <= ").push_bind(to);
            }
        };

        let order_by = format!(" ORDER BY created_at {}, id", direction.as_sql());
        fetch_page(
            &self.pool,
            "*",
            "FROM audit_log",
            apply,
            &order_by,
            page,
            "Failed to search audit log",
        )
        .await
    }

    /// Create an audit log entry outside any transaction.
    pub async fn create(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        insert_entry(&mut conn, data).await
    }
}

/// Insert an audit entry on an existing connection or transaction.
pub(crate) async fn insert_entry(
    conn: &mut PgConnection,
    data: &CreateAuditLogEntry,
) -> AppResult<AuditLogEntry> {
    sqlx::query_as::<_, AuditLogEntry>(
        "INSERT INTO audit_log (actor_id, action, target_type, target_id, details, ip_address) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(data.actor_id)
    .bind(&data.action)
    .bind(&data.target_type)
    .bind(data.target_id)
    .bind(&data.details)
    .bind(&data.ip_address)
    .fetch_one(conn)
    .await
    .map_err(db_error("Failed to create audit entry"))
}
