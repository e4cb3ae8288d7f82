//! Roadmap repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::{SortSpec, SortWhitelist};
use comhub_entity::roadmap::{
    CreateRoadmap, NewRoadmapStep, Roadmap, RoadmapStep, RoadmapWithSteps, UpdateRoadmap,
};

use crate::query::{Conditions, Filter, db_error, fetch_page, is_unique_violation};

/// Sortable roadmap fields.
pub const ROADMAP_SORT: SortWhitelist = &[
    ("title", "r.title"),
    ("created_at", "r.created_at"),
    ("updated_at", "r.updated_at"),
];

/// Typed roadmap listing filters.
#[derive(Debug, Clone, Default)]
pub struct RoadmapFilter {
    pub is_published: Option<bool>,
    pub search: Option<TextSearch>,
}

/// Repository for roadmaps and their steps.
#[derive(Debug, Clone)]
pub struct RoadmapRepository {
    pool: PgPool,
}

impl RoadmapRepository {
    /// Create a new roadmap repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a roadmap and its ordered steps.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoadmapWithSteps>> {
        let Some(roadmap) = sqlx::query_as::<_, Roadmap>("SELECT * FROM roadmaps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find roadmap"))?
        else {
            return Ok(None);
        };

        let steps = sqlx::query_as::<_, RoadmapStep>(
            "SELECT * FROM roadmap_steps WHERE roadmap_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load roadmap steps"))?;

        Ok(Some(RoadmapWithSteps { roadmap, steps }))
    }

    pub async fn list(
        &self,
        filter: &RoadmapFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Roadmap>> {
        let apply = |qb: &mut Filter| {
            let mut cond = Conditions::new(qb);
            if let Some(published) = filter.is_published {
                cond.next().push("r.is_published = ").push_bind(published);
            }
            if let Some(search) = &filter.search {
                let pattern = search.pattern();
                cond.next()
                    .push("(r.title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR r.summary ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        };

        fetch_page(
            &self.pool,
            "r.*",
            "FROM roadmaps r",
            apply,
            &sort.order_by("r.id"),
            page,
            "Failed to list roadmaps",
        )
        .await
    }

    pub async fn create(&self, data: &CreateRoadmap) -> AppResult<Roadmap> {
        sqlx::query_as::<_, Roadmap>(
            "INSERT INTO roadmaps (slug, title, summary) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.summary)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "roadmaps_slug_key") {
                AppError::conflict(format!("A roadmap with slug '{}' already exists", data.slug))
                    .with_code("SLUG_TAKEN")
            } else {
                AppError::database("Failed to create roadmap", e)
            }
        })
    }

    pub async fn update(&self, id: Uuid, data: &UpdateRoadmap) -> AppResult<Roadmap> {
        sqlx::query_as::<_, Roadmap>(
            "UPDATE roadmaps SET title = COALESCE($2, title), \
                                 summary = COALESCE($3, summary), \
                                 is_published = COALESCE($4, is_published), \
                                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.summary)
        .bind(data.is_published)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update roadmap"))?
        .ok_or_else(|| AppError::not_found(format!("Roadmap {id} not found")))
    }

    /// Replace all steps of a roadmap in one transaction. Positions follow
    /// the order of `steps`, starting at 1.
    pub async fn replace_steps(
        &self,
        id: Uuid,
        steps: &[NewRoadmapStep],
    ) -> AppResult<RoadmapWithSteps> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let roadmap = sqlx::query_as::<_, Roadmap>(
            "UPDATE roadmaps SET updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock roadmap"))?
        .ok_or_else(|| AppError::not_found(format!("Roadmap {id} not found")))?;

        sqlx::query("DELETE FROM roadmap_steps WHERE roadmap_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear roadmap steps"))?;

        let mut inserted = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let row = sqlx::query_as::<_, RoadmapStep>(
                "INSERT INTO roadmap_steps (roadmap_id, position, title, description, resource_url) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING *",
            )
            .bind(id)
            .bind(index as i32 + 1)
            .bind(&step.title)
            .bind(&step.description)
            .bind(&step.resource_url)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to insert roadmap step"))?;
            inserted.push(row);
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit roadmap steps"))?;
        Ok(RoadmapWithSteps {
            roadmap,
            steps: inserted,
        })
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roadmaps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete roadmap"))?;
        Ok(result.rows_affected() > 0)
    }
}
