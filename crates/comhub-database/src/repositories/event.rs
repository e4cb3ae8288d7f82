//! Event repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::{SortSpec, SortWhitelist};
use comhub_entity::event::{CreateEvent, Event, EventStatus, UpdateEvent};

use crate::query::{Conditions, Filter, db_error, fetch_page, is_unique_violation};

/// Sortable event fields.
pub const EVENT_SORT: SortWhitelist = &[
    ("starts_at", "e.starts_at"),
    ("title", "e.title"),
    ("created_at", "e.created_at"),
    ("status", "e.status"),
];

/// Typed event listing filters.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Restrict to these statuses; empty means any.
    pub statuses: Vec<EventStatus>,
    /// Events starting at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Events starting at or before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Matches title, description or location.
    pub search: Option<TextSearch>,
}

/// Repository for events.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find event"))
    }

    /// List events.
    pub async fn list(
        &self,
        filter: &EventFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Event>> {
        let apply = |qb: &mut Filter| {
            let mut cond = Conditions::new(qb);
            if !filter.statuses.is_empty() {
                cond.next()
                    .push("e.status = ANY(")
                    .push_bind(filter.statuses.clone())
                    .push(")");
            }
            if let Some(from) = filter.from {
                cond.next().push("e.starts_at >= ").push_bind(from);
            }
            if let Some(to) = filter.to {
                cond.next().push("e.starts_at <= ").push_bind(to);
            }
            if let Some(search) = &filter.search {
                let pattern = search.pattern();
                cond.next()
                    .push("(e.title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR e.description ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR e.location ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        };

        fetch_page(
            &self.pool,
            "e.*",
            "FROM events e",
            apply,
            &sort.order_by("e.id"),
            page,
            "Failed to list events",
        )
        .await
    }

    /// Create an event in `draft` status.
    pub async fn create(&self, data: &CreateEvent) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (slug, title, description, location, starts_at, ends_at, \
                                 capacity, requires_approval, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.location)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.capacity)
        .bind(data.requires_approval)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, &data.slug, "Failed to create event"))
    }

    /// Update event fields. `capacity: Some(None)` clears the limit.
    pub async fn update(&self, id: Uuid, data: &UpdateEvent) -> AppResult<Event> {
        let (set_capacity, capacity) = match data.capacity {
            Some(value) => (true, value),
            None => (false, None),
        };

        sqlx::query_as::<_, Event>(
            "UPDATE events SET title = COALESCE($2, title), \
                               description = COALESCE($3, description), \
                               location = COALESCE($4, location), \
                               starts_at = COALESCE($5, starts_at), \
                               ends_at = COALESCE($6, ends_at), \
                               capacity = CASE WHEN $7 THEN $8 ELSE capacity END, \
                               requires_approval = COALESCE($9, requires_approval), \
                               updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.location)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(set_capacity)
        .bind(capacity)
        .bind(data.requires_approval)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update event"))?
        .ok_or_else(|| AppError::not_found(format!("Event {id} not found")))
    }

    /// Set the status of an event.
    pub async fn update_status(&self, id: Uuid, status: EventStatus) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update event status"))?
        .ok_or_else(|| AppError::not_found(format!("Event {id} not found")))
    }

    /// Delete an event; its registrations cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete event"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn slug_conflict(e: sqlx::Error, slug: &str, context: &'static str) -> AppError {
    if is_unique_violation(&e, "events_slug_key") {
        AppError::conflict(format!("An event with slug '{slug}' already exists"))
            .with_code("SLUG_TAKEN")
    } else {
        AppError::database(context, e)
    }
}
