//! Learning roadmaps with ordered steps.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortSpec;
use comhub_database::repositories::roadmap::{RoadmapFilter, RoadmapRepository};
use comhub_entity::roadmap::{
    CreateRoadmap, NewRoadmapStep, Roadmap, RoadmapWithSteps, UpdateRoadmap,
};

use crate::context::RequestContext;
use crate::validation::validate_slug;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoadmapRequest {
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub steps: Vec<RoadmapStepRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoadmapRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub is_published: Option<bool>,
}

/// One step; its position is its index in the submitted list.
#[derive(Debug, Clone, Deserialize)]
pub struct RoadmapStepRequest {
    pub title: String,
    pub description: Option<String>,
    pub resource_url: Option<String>,
}

fn to_steps(steps: Vec<RoadmapStepRequest>) -> Result<Vec<NewRoadmapStep>, AppError> {
    steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| {
            let title = step.title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::invalid_field(
                    &format!("steps[{index}].title"),
                    "must not be empty",
                ));
            }
            Ok(NewRoadmapStep {
                title,
                description: step.description,
                resource_url: step.resource_url,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RoadmapService {
    roadmaps: Arc<RoadmapRepository>,
}

impl RoadmapService {
    pub fn new(roadmaps: Arc<RoadmapRepository>) -> Self {
        Self { roadmaps }
    }

    /// Lists published roadmaps.
    pub async fn public_list(
        &self,
        search: Option<TextSearch>,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Roadmap>> {
        let filter = RoadmapFilter {
            is_published: Some(true),
            search,
        };
        self.roadmaps.list(&filter, sort, page).await
    }

    /// Gets a published roadmap with its steps in order.
    pub async fn public_get(&self, id: Uuid) -> AppResult<RoadmapWithSteps> {
        match self.roadmaps.find_by_id(id).await? {
            Some(found) if found.roadmap.is_published => Ok(found),
            _ => Err(not_found(id)),
        }
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &RoadmapFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Roadmap>> {
        ctx.require("roadmaps:read")?;
        self.roadmaps.list(filter, sort, page).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<RoadmapWithSteps> {
        ctx.require("roadmaps:read")?;
        self.roadmaps.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Creates an unpublished roadmap together with its initial steps.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateRoadmapRequest,
    ) -> AppResult<RoadmapWithSteps> {
        ctx.require("roadmaps:write")?;
        let slug = req.slug.trim().to_string();
        validate_slug(&slug)?;
        let title = req.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::invalid_field("title", "must not be empty"));
        }
        let steps = to_steps(req.steps)?;

        let roadmap = self
            .roadmaps
            .create(&CreateRoadmap {
                slug,
                title,
                summary: req.summary,
            })
            .await?;
        let created = self.roadmaps.replace_steps(roadmap.id, &steps).await?;

        info!(roadmap_id = %roadmap.id, steps = steps.len(), created_by = %ctx.user_id, "Roadmap created");
        Ok(created)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateRoadmapRequest,
    ) -> AppResult<Roadmap> {
        ctx.require("roadmaps:write")?;
        let title = req.title.map(|t| t.trim().to_string());
        if title.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::invalid_field("title", "must not be empty"));
        }

        let roadmap = self
            .roadmaps
            .update(
                id,
                &UpdateRoadmap {
                    title,
                    summary: req.summary,
                    is_published: req.is_published,
                },
            )
            .await?;
        info!(roadmap_id = %id, published = roadmap.is_published, "Roadmap updated");
        Ok(roadmap)
    }

    /// Replaces all steps of a roadmap in one transaction.
    pub async fn replace_steps(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        steps: Vec<RoadmapStepRequest>,
    ) -> AppResult<RoadmapWithSteps> {
        ctx.require("roadmaps:write")?;
        let steps = to_steps(steps)?;
        self.roadmaps.replace_steps(id, &steps).await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require("roadmaps:write")?;
        if !self.roadmaps.delete(id).await? {
            return Err(not_found(id));
        }
        info!(roadmap_id = %id, deleted_by = %ctx.user_id, "Roadmap deleted");
        Ok(())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Roadmap {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_titles_are_required() {
        let err = to_steps(vec![
            RoadmapStepRequest {
                title: "Install the toolchain".into(),
                description: None,
                resource_url: None,
            },
            RoadmapStepRequest {
                title: "  ".into(),
                description: None,
                resource_url: None,
            },
        ])
        .unwrap_err();
        assert_eq!(err.details.unwrap()["steps[1].title"][0], "must not be empty");
    }

    #[test]
    fn test_steps_keep_order() {
        let steps = to_steps(vec![
            RoadmapStepRequest {
                title: "First".into(),
                description: None,
                resource_url: None,
            },
            RoadmapStepRequest {
                title: " Second ".into(),
                description: Some("details".into()),
                resource_url: None,
            },
        ])
        .unwrap();
        assert_eq!(steps[0].title, "First");
        assert_eq!(steps[1].title, "Second");
    }
}
