//! Registration repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::{SortSpec, SortWhitelist};
use comhub_entity::audit::CreateAuditLogEntry;
use comhub_entity::event::Event;
use comhub_entity::registration::{CreateRegistration, Registration, RegistrationStatus};

use super::audit::insert_entry;
use crate::query::{Conditions, Filter, db_error, fetch_page};

/// Sortable registration fields.
pub const REGISTRATION_SORT: SortWhitelist = &[
    ("created_at", "r.created_at"),
    ("email", "r.email"),
    ("full_name", "r.full_name"),
    ("status", "r.status"),
];

/// Typed registration listing filters.
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub status: Option<RegistrationStatus>,
    /// Matches email or full name.
    pub search: Option<TextSearch>,
}

/// Repository for event registrations.
#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Create a new registration repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a registration by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Registration>> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find registration"))
    }

    /// Find a registration by its natural key.
    pub async fn find_by_event_and_email(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> AppResult<Option<Registration>> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = $1 AND LOWER(email) = LOWER($2)",
        )
        .bind(event_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find registration"))
    }

    /// List registrations of one event.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
        filter: &RegistrationFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Registration>> {
        let apply = |qb: &mut Filter| {
            let mut cond = Conditions::new(qb);
            cond.next().push("r.event_id = ").push_bind(event_id);
            if let Some(status) = filter.status {
                cond.next().push("r.status = ").push_bind(status);
            }
            if let Some(search) = &filter.search {
                let pattern = search.pattern();
                cond.next()
                    .push("(r.email ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR r.full_name ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        };

        fetch_page(
            &self.pool,
            "r.*",
            "FROM registrations r",
            apply,
            &sort.order_by("r.id"),
            page,
            "Failed to list registrations",
        )
        .await
    }

    /// Count approved registrations of an event.
    pub async fn count_approved(&self, event_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'approved'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count registrations"))
    }

    /// Insert a registration, or re-open a cancelled one for the same
    /// `(event, email)`.
    ///
    /// Runs in one transaction with the event row locked so that capacity
    /// checks for auto-approved registrations cannot be raced.
    pub async fn register(&self, data: &CreateRegistration) -> AppResult<Registration> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(data.event_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock event"))?
            .ok_or_else(|| AppError::not_found(format!("Event {} not found", data.event_id)))?;

        if data.status == RegistrationStatus::Approved {
            let approved: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'approved'",
            )
            .bind(data.event_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count registrations"))?;
            if !event.has_room(approved) {
                return Err(event_full(&event));
            }
        }

        let registration = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (event_id, email, full_name, user_id, note, status) \
             VALUES ($1, LOWER($2), $3, $4, $5, $6) \
             ON CONFLICT (event_id, LOWER(email)) DO UPDATE \
                SET full_name = EXCLUDED.full_name, \
                    user_id = EXCLUDED.user_id, \
                    note = EXCLUDED.note, \
                    status = EXCLUDED.status, \
                    decided_by = NULL, \
                    decided_at = NULL, \
                    updated_at = NOW() \
                WHERE registrations.status = 'cancelled' \
             RETURNING *",
        )
        .bind(data.event_id)
        .bind(&data.email)
        .bind(&data.full_name)
        .bind(data.user_id)
        .bind(&data.note)
        .bind(data.status)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to create registration"))?
        .ok_or_else(|| {
            AppError::conflict(format!(
                "'{}' is already registered for this event",
                data.email
            ))
            .with_code("ALREADY_REGISTERED")
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit registration"))?;
        Ok(registration)
    }

    /// Move a pending registration to `approved` or `rejected`, or any open
    /// registration to `cancelled`, in one transaction with its audit entry.
    ///
    /// Approval re-checks capacity with the event row locked.
    pub async fn transition(
        &self,
        id: Uuid,
        next: RegistrationStatus,
        decided_by: Option<Uuid>,
        audit: &CreateAuditLogEntry,
    ) -> AppResult<Registration> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let current = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock registration"))?
        .ok_or_else(|| AppError::not_found(format!("Registration {id} not found")))?;

        let allowed = match next {
            RegistrationStatus::Approved | RegistrationStatus::Rejected => {
                current.status.is_decidable()
            }
            RegistrationStatus::Cancelled => current.status.is_open(),
            RegistrationStatus::Pending => false,
        };
        if !allowed {
            return Err(AppError::conflict(format!(
                "Registration is {} and cannot become {next}",
                current.status
            ))
            .with_code("INVALID_TRANSITION"));
        }

        if next == RegistrationStatus::Approved {
            let event =
                sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
                    .bind(current.event_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_error("Failed to lock event"))?;
            let approved: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'approved'",
            )
            .bind(current.event_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count registrations"))?;
            if !event.has_room(approved) {
                return Err(event_full(&event));
            }
        }

        let updated = sqlx::query_as::<_, Registration>(
            "UPDATE registrations SET status = $2, decided_by = $3, decided_at = NOW(), \
                                      updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .bind(decided_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update registration"))?;

        insert_entry(&mut tx, audit).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit registration change"))?;
        Ok(updated)
    }
}

fn event_full(event: &Event) -> AppError {
    AppError::conflict(format!("Event '{}' is full", event.title)).with_code("EVENT_FULL")
}
