//! Mentor directory.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use comhub_cache::{DistributedLock, keys};
use comhub_core::config::lock::LockConfig;
use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortSpec;
use comhub_database::repositories::mentor::{MentorFilter, MentorRepository};
use comhub_entity::mentor::{CreateMentor, Mentor, UpdateMentor};

use crate::context::RequestContext;
use crate::validation::{normalize_email, normalize_tags};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMentorRequest {
    pub full_name: String,
    pub email: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMentorRequest {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Public mentor listing and admin CRUD. Every mutation is serialised per
/// mentor through the distributed lock.
#[derive(Debug, Clone)]
pub struct MentorService {
    mentors: Arc<MentorRepository>,
    lock: Arc<DistributedLock>,
    lock_ttl: Duration,
}

impl MentorService {
    pub fn new(mentors: Arc<MentorRepository>, lock: Arc<DistributedLock>, config: &LockConfig) -> Self {
        Self {
            mentors,
            lock,
            lock_ttl: Duration::from_millis(config.mentor_ttl_ms),
        }
    }

    /// Lists active mentors.
    pub async fn public_list(
        &self,
        filter: MentorFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Mentor>> {
        let filter = MentorFilter {
            is_active: Some(true),
            ..filter
        };
        self.mentors.list(&filter, sort, page).await
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &MentorFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Mentor>> {
        ctx.require("mentors:read")?;
        self.mentors.list(filter, sort, page).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Mentor> {
        ctx.require("mentors:read")?;
        self.mentors.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Creates a mentor under the `mentor:email:{email}` lock.
    pub async fn create(&self, ctx: &RequestContext, req: CreateMentorRequest) -> AppResult<Mentor> {
        ctx.require("mentors:write")?;
        let email = normalize_email(&req.email);
        let full_name = req.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AppError::invalid_field("full_name", "must not be empty"));
        }

        let data = CreateMentor {
            full_name,
            email: email.clone(),
            headline: req.headline,
            bio: req.bio,
            expertise: normalize_tags(req.expertise),
        };

        let mentor = self
            .lock
            .with_lock(&keys::mentor_email_lock(&email), self.lock_ttl, || async {
                if self.mentors.find_by_email(&email).await?.is_some() {
                    return Err(AppError::conflict(format!(
                        "A mentor with email '{email}' already exists"
                    ))
                    .with_code("MENTOR_EXISTS"));
                }
                self.mentors.create(&data).await
            })
            .await?;

        info!(mentor_id = %mentor.id, created_by = %ctx.user_id, "Mentor created");
        Ok(mentor)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateMentorRequest,
    ) -> AppResult<Mentor> {
        ctx.require("mentors:write")?;
        if req.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::invalid_field("full_name", "must not be empty"));
        }

        let data = UpdateMentor {
            full_name: req.full_name.map(|n| n.trim().to_string()),
            headline: req.headline,
            bio: req.bio,
            expertise: req.expertise.map(normalize_tags),
            is_active: req.is_active,
        };

        let mentor = self
            .lock
            .with_lock(&keys::mentor_lock(id), self.lock_ttl, || {
                self.mentors.update(id, &data)
            })
            .await?;

        info!(mentor_id = %id, updated_by = %ctx.user_id, "Mentor updated");
        Ok(mentor)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require("mentors:write")?;
        let deleted = self
            .lock
            .with_lock(&keys::mentor_lock(id), self.lock_ttl, || self.mentors.delete(id))
            .await?;
        if !deleted {
            return Err(not_found(id));
        }
        info!(mentor_id = %id, deleted_by = %ctx.user_id, "Mentor deleted");
        Ok(())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Mentor {id} not found"))
}
