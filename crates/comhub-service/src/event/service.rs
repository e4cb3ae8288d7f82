//! Event publishing and administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::info;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortSpec;
use comhub_database::repositories::event::{EventFilter, EventRepository};
use comhub_entity::event::{CreateEvent, Event, EventStatus, UpdateEvent};

use crate::context::RequestContext;
use crate::validation::{validate_capacity, validate_schedule, validate_slug};

/// Request to create an event. New events start as drafts.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    #[serde(default)]
    pub requires_approval: bool,
}

/// Partial event update. `"capacity": null` removes the limit while an
/// absent `capacity` leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub capacity: Option<Option<i32>>,
    pub requires_approval: Option<bool>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

/// Public and administrative event operations.
#[derive(Debug, Clone)]
pub struct EventService {
    events: Arc<EventRepository>,
}

impl EventService {
    pub fn new(events: Arc<EventRepository>) -> Self {
        Self { events }
    }

    /// Lists published events. Any status in `filter` is ignored.
    pub async fn public_list(
        &self,
        filter: EventFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Event>> {
        let filter = EventFilter {
            statuses: vec![EventStatus::Published],
            ..filter
        };
        self.events.list(&filter, sort, page).await
    }

    /// Gets an event that is visible to the public. Drafts and archived
    /// events are reported as missing.
    pub async fn public_get(&self, id: Uuid) -> AppResult<Event> {
        match self.events.find_by_id(id).await? {
            Some(event) if event.status.is_public() => Ok(event),
            _ => Err(not_found(id)),
        }
    }

    /// Lists events in any status.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &EventFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Event>> {
        ctx.require("events:read")?;
        self.events.list(filter, sort, page).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Event> {
        ctx.require("events:read")?;
        self.find(id).await
    }

    pub async fn create(&self, ctx: &RequestContext, req: CreateEventRequest) -> AppResult<Event> {
        ctx.require("events:write")?;
        let slug = req.slug.trim().to_string();
        validate_slug(&slug)?;
        validate_schedule(req.starts_at, req.ends_at)?;
        validate_capacity(req.capacity)?;

        let event = self
            .events
            .create(&CreateEvent {
                slug,
                title: req.title.trim().to_string(),
                description: req.description,
                location: req.location,
                starts_at: req.starts_at,
                ends_at: req.ends_at,
                capacity: req.capacity,
                requires_approval: req.requires_approval,
                created_by: Some(ctx.user_id),
            })
            .await?;

        info!(event_id = %event.id, slug = %event.slug, created_by = %ctx.user_id, "Event created");
        Ok(event)
    }

    /// Updates event fields, checking the resulting schedule as a whole.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateEventRequest,
    ) -> AppResult<Event> {
        ctx.require("events:write")?;

        if req.starts_at.is_some() || req.ends_at.is_some() {
            let current = self.find(id).await?;
            validate_schedule(
                req.starts_at.unwrap_or(current.starts_at),
                req.ends_at.unwrap_or(current.ends_at),
            )?;
        }
        if let Some(capacity) = req.capacity {
            validate_capacity(capacity)?;
        }

        let event = self
            .events
            .update(
                id,
                &UpdateEvent {
                    title: req.title.map(|t| t.trim().to_string()),
                    description: req.description,
                    location: req.location,
                    starts_at: req.starts_at,
                    ends_at: req.ends_at,
                    capacity: req.capacity,
                    requires_approval: req.requires_approval,
                },
            )
            .await?;

        info!(event_id = %id, updated_by = %ctx.user_id, "Event updated");
        Ok(event)
    }

    /// Moves an event through its lifecycle.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        next: EventStatus,
    ) -> AppResult<Event> {
        ctx.require("events:write")?;
        let current = self.find(id).await?;
        if current.status == next {
            return Ok(current);
        }
        if !current.status.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Event is {} and cannot become {next}",
                current.status
            ))
            .with_code("INVALID_TRANSITION"));
        }

        let event = self.events.update_status(id, next).await?;
        info!(
            event_id = %id,
            from = %current.status,
            to = %next,
            changed_by = %ctx.user_id,
            "Event status changed"
        );
        Ok(event)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require("events:write")?;
        if !self.events.delete(id).await? {
            return Err(not_found(id));
        }
        info!(event_id = %id, deleted_by = %ctx.user_id, "Event deleted");
        Ok(())
    }

    pub(crate) async fn find(&self, id: Uuid) -> AppResult<Event> {
        self.events.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Event {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_absent_vs_null() {
        let absent: UpdateEventRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.capacity, None);

        let cleared: UpdateEventRequest = serde_json::from_str(r#"{"capacity":null}"#).unwrap();
        assert_eq!(cleared.capacity, Some(None));

        let set: UpdateEventRequest = serde_json::from_str(r#"{"capacity":40}"#).unwrap();
        assert_eq!(set.capacity, Some(Some(40)));
    }

    #[test]
    fn test_create_defaults_to_no_approval() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"slug":"meetup","title":"Meetup","starts_at":"2025-05-01T18:00:00Z","ends_at":"2025-05-01T21:00:00Z"}"#,
        )
        .unwrap();
        assert!(!req.requires_approval);
        assert!(req.capacity.is_none());
    }
}
