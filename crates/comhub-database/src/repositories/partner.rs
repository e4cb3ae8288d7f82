//! Partner repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::{SortSpec, SortWhitelist};
use comhub_entity::partner::{CreatePartner, Partner, PartnerTier, UpdatePartner};

use crate::query::{Conditions, Filter, db_error, fetch_page, is_unique_violation};

/// Sortable partner fields. `tier` sorts by enum order (platinum first).
pub const PARTNER_SORT: SortWhitelist = &[
    ("name", "p.name"),
    ("tier", "p.tier"),
    ("created_at", "p.created_at"),
];

/// Typed partner listing filters.
#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    pub is_active: Option<bool>,
    pub tier: Option<PartnerTier>,
}

/// Repository for partners.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    pool: PgPool,
}

impl PartnerRepository {
    /// Create a new partner repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Partner>> {
        sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find partner"))
    }

    pub async fn list(
        &self,
        filter: &PartnerFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Partner>> {
        let apply = |qb: &mut Filter| {
            let mut cond = Conditions::new(qb);
            if let Some(active) = filter.is_active {
                cond.next().push("p.is_active = ").push_bind(active);
            }
            if let Some(tier) = filter.tier {
                cond.next().push("p.tier = ").push_bind(tier);
            }
        };

        fetch_page(
            &self.pool,
            "p.*",
            "FROM partners p",
            apply,
            &sort.order_by("p.id"),
            page,
            "Failed to list partners",
        )
        .await
    }

    pub async fn create(&self, data: &CreatePartner) -> AppResult<Partner> {
        sqlx::query_as::<_, Partner>(
            "INSERT INTO partners (name, website, logo_url, tier) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.website)
        .bind(&data.logo_url)
        .bind(data.tier)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| name_conflict(e, "Failed to create partner"))
    }

    pub async fn update(&self, id: Uuid, data: &UpdatePartner) -> AppResult<Partner> {
        sqlx::query_as::<_, Partner>(
            "UPDATE partners SET name = COALESCE($2, name), \
                                 website = COALESCE($3, website), \
                                 logo_url = COALESCE($4, logo_url), \
                                 tier = COALESCE($5, tier), \
                                 is_active = COALESCE($6, is_active), \
                                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.website)
        .bind(&data.logo_url)
        .bind(data.tier)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| name_conflict(e, "Failed to update partner"))?
        .ok_or_else(|| AppError::not_found(format!("Partner {id} not found")))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM partners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete partner"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn name_conflict(e: sqlx::Error, context: &'static str) -> AppError {
    if is_unique_violation(&e, "partners_name_key") {
        AppError::conflict("A partner with that name already exists").with_code("PARTNER_EXISTS")
    } else {
        AppError::database(context, e)
    }
}
