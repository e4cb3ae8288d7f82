//! Event registration and the approval workflow.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use comhub_cache::{DistributedLock, keys};
use comhub_core::config::lock::LockConfig;
use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortSpec;
use comhub_database::repositories::event::EventRepository;
use comhub_database::repositories::registration::{RegistrationFilter, RegistrationRepository};
use comhub_entity::audit::CreateAuditLogEntry;
use comhub_entity::registration::{CreateRegistration, Registration, RegistrationStatus};

use crate::context::RequestContext;
use crate::validation::normalize_email;

/// A public registration submission.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub note: Option<String>,
}

/// Registers attendees and lets organizers decide on them.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    registrations: Arc<RegistrationRepository>,
    events: Arc<EventRepository>,
    lock: Arc<DistributedLock>,
    lock_ttl: Duration,
}

impl RegistrationService {
    pub fn new(
        registrations: Arc<RegistrationRepository>,
        events: Arc<EventRepository>,
        lock: Arc<DistributedLock>,
        config: &LockConfig,
    ) -> Self {
        Self {
            registrations,
            events,
            lock,
            lock_ttl: Duration::from_millis(config.registration_ttl_ms),
        }
    }

    /// Registers `req.email` for a published event.
    ///
    /// Runs under the `(event, email)` lock so that concurrent submissions
    /// of the same form produce exactly one registration. Events without
    /// approval approve immediately, subject to capacity.
    pub async fn register(
        &self,
        event_id: Uuid,
        req: RegisterRequest,
        user_id: Option<Uuid>,
    ) -> AppResult<Registration> {
        let email = normalize_email(&req.email);
        let full_name = req.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AppError::invalid_field("full_name", "must not be empty"));
        }

        let key = keys::registration_lock(event_id, &email);
        let registration = self
            .lock
            .with_lock(&key, self.lock_ttl, || async {
                let event = self
                    .events
                    .find_by_id(event_id)
                    .await?
                    .filter(|e| e.status.is_public())
                    .ok_or_else(|| AppError::not_found(format!("Event {event_id} not found")))?;

                if !event.status.accepts_registrations() {
                    return Err(AppError::conflict(format!(
                        "Event '{}' is not open for registration",
                        event.slug
                    ))
                    .with_code("EVENT_CLOSED"));
                }

                let existing = self
                    .registrations
                    .find_by_event_and_email(event_id, &email)
                    .await?;
                if existing.is_some_and(|r| r.status != RegistrationStatus::Cancelled) {
                    return Err(AppError::conflict(format!(
                        "'{email}' is already registered for this event"
                    ))
                    .with_code("ALREADY_REGISTERED"));
                }

                if !event.has_room(self.registrations.count_approved(event_id).await?) {
                    return Err(AppError::conflict(format!("Event '{}' is full", event.slug))
                        .with_code("EVENT_FULL"));
                }

                let status = if event.requires_approval {
                    RegistrationStatus::Pending
                } else {
                    RegistrationStatus::Approved
                };

                self.registrations
                    .register(&CreateRegistration {
                        event_id,
                        email: email.clone(),
                        full_name,
                        user_id,
                        note: req.note,
                        status,
                    })
                    .await
            })
            .await?;

        info!(
            registration_id = %registration.id,
            event_id = %event_id,
            status = %registration.status,
            "Registration submitted"
        );
        Ok(registration)
    }

    /// Lists the registrations of one event.
    pub async fn list_for_event(
        &self,
        ctx: &RequestContext,
        event_id: Uuid,
        filter: &RegistrationFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Registration>> {
        ctx.require("registrations:read")?;
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(AppError::not_found(format!("Event {event_id} not found")));
        }
        self.registrations
            .list_for_event(event_id, filter, sort, page)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Registration> {
        ctx.require("registrations:read")?;
        self.registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Registration {id} not found")))
    }

    /// Approves a pending registration, re-checking capacity.
    pub async fn approve(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Registration> {
        self.decide(ctx, id, RegistrationStatus::Approved, "registration.approved")
            .await
    }

    pub async fn reject(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Registration> {
        self.decide(ctx, id, RegistrationStatus::Rejected, "registration.rejected")
            .await
    }

    /// Cancels a pending or approved registration.
    pub async fn cancel(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Registration> {
        self.decide(ctx, id, RegistrationStatus::Cancelled, "registration.cancelled")
            .await
    }

    async fn decide(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        next: RegistrationStatus,
        action: &str,
    ) -> AppResult<Registration> {
        ctx.require("registrations:approve")?;

        let audit = CreateAuditLogEntry::new(Some(ctx.user_id), action, "registration", Some(id))
            .details(json!({ "status": next }))
            .ip(ctx.ip_address.clone());

        let registration = self
            .registrations
            .transition(id, next, Some(ctx.user_id), &audit)
            .await?;

        info!(
            registration_id = %id,
            event_id = %registration.event_id,
            status = %next,
            decided_by = %ctx.user_id,
            "Registration decided"
        );
        Ok(registration)
    }
}
