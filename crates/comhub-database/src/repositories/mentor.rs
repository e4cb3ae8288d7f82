//! Mentor repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::{SortSpec, SortWhitelist};
use comhub_entity::mentor::{CreateMentor, Mentor, UpdateMentor};

use crate::query::{Conditions, Filter, db_error, fetch_page, is_unique_violation};

/// Sortable mentor fields.
pub const MENTOR_SORT: SortWhitelist = &[
    ("full_name", "m.full_name"),
    ("created_at", "m.created_at"),
];

/// Typed mentor listing filters.
#[derive(Debug, Clone, Default)]
pub struct MentorFilter {
    pub is_active: Option<bool>,
    /// Mentors listing this expertise tag.
    pub expertise: Option<String>,
    /// Matches name or headline.
    pub search: Option<TextSearch>,
}

/// Repository for mentors.
#[derive(Debug, Clone)]
pub struct MentorRepository {
    pool: PgPool,
}

impl MentorRepository {
    /// Create a new mentor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Mentor>> {
        sqlx::query_as::<_, Mentor>("SELECT * FROM mentors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find mentor"))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Mentor>> {
        sqlx::query_as::<_, Mentor>("SELECT * FROM mentors WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find mentor by email"))
    }

    pub async fn list(
        &self,
        filter: &MentorFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Mentor>> {
        let apply = |qb: &mut Filter| {
            let mut cond = Conditions::new(qb);
            if let Some(active) = filter.is_active {
                cond.next().push("m.is_active = ").push_bind(active);
            }
            if let Some(tag) = &filter.expertise {
                cond.next()
                    .push("LOWER(")
                    .push_bind(tag.clone())
                    .push(") = ANY(SELECT LOWER(x) FROM UNNEST(m.expertise) AS x)");
            }
            if let Some(search) = &filter.search {
                let pattern = search.pattern();
                cond.next()
                    .push("(m.full_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR m.headline ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        };

        fetch_page(
            &self.pool,
            "m.*",
            "FROM mentors m",
            apply,
            &sort.order_by("m.id"),
            page,
            "Failed to list mentors",
        )
        .await
    }

    pub async fn create(&self, data: &CreateMentor) -> AppResult<Mentor> {
        sqlx::query_as::<_, Mentor>(
            "INSERT INTO mentors (full_name, email, headline, bio, expertise) \
             VALUES ($1, LOWER($2), $3, $4, $5) RETURNING *",
        )
        .bind(&data.full_name)
        .bind(&data.email)
        .bind(&data.headline)
        .bind(&data.bio)
        .bind(&data.expertise)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "mentors_email_key") {
                AppError::conflict(format!("A mentor with email '{}' already exists", data.email))
                    .with_code("MENTOR_EXISTS")
            } else {
                AppError::database("Failed to create mentor", e)
            }
        })
    }

    pub async fn update(&self, id: Uuid, data: &UpdateMentor) -> AppResult<Mentor> {
        sqlx::query_as::<_, Mentor>(
            "UPDATE mentors SET full_name = COALESCE($2, full_name), \
                                headline = COALESCE($3, headline), \
                                bio = COALESCE($4, bio), \
                                expertise = COALESCE($5, expertise), \
                                is_active = COALESCE($6, is_active), \
                                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.full_name)
        .bind(&data.headline)
        .bind(&data.bio)
        .bind(&data.expertise)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update mentor"))?
        .ok_or_else(|| AppError::not_found(format!("Mentor {id} not found")))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM mentors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete mentor"))?;
        Ok(result.rows_affected() > 0)
    }
}
