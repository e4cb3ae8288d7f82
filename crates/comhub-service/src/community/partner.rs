//! Sponsor and partner directory.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};
use comhub_core::types::sorting::SortSpec;
use comhub_database::repositories::partner::{PartnerFilter, PartnerRepository};
use comhub_entity::partner::{CreatePartner, Partner, PartnerTier, UpdatePartner};

use crate::context::RequestContext;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartnerRequest {
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: PartnerTier,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePartnerRequest {
    pub name: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<PartnerTier>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PartnerService {
    partners: Arc<PartnerRepository>,
}

impl PartnerService {
    pub fn new(partners: Arc<PartnerRepository>) -> Self {
        Self { partners }
    }

    /// Lists active partners, optionally restricted to one tier.
    pub async fn public_list(
        &self,
        tier: Option<PartnerTier>,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Partner>> {
        let filter = PartnerFilter {
            is_active: Some(true),
            tier,
        };
        self.partners.list(&filter, sort, page).await
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &PartnerFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> AppResult<PageResponse<Partner>> {
        ctx.require("partners:read")?;
        self.partners.list(filter, sort, page).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Partner> {
        ctx.require("partners:read")?;
        self.partners.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, ctx: &RequestContext, req: CreatePartnerRequest) -> AppResult<Partner> {
        ctx.require("partners:write")?;
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::invalid_field("name", "must not be empty"));
        }

        let partner = self
            .partners
            .create(&CreatePartner {
                name,
                website: req.website,
                logo_url: req.logo_url,
                tier: req.tier,
            })
            .await?;

        info!(partner_id = %partner.id, tier = %partner.tier, "Partner created");
        Ok(partner)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdatePartnerRequest,
    ) -> AppResult<Partner> {
        ctx.require("partners:write")?;
        let name = req.name.map(|n| n.trim().to_string());
        if name.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::invalid_field("name", "must not be empty"));
        }

        self.partners
            .update(
                id,
                &UpdatePartner {
                    name,
                    website: req.website,
                    logo_url: req.logo_url,
                    tier: req.tier,
                    is_active: req.is_active,
                },
            )
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require("partners:write")?;
        if !self.partners.delete(id).await? {
            return Err(not_found(id));
        }
        info!(partner_id = %id, deleted_by = %ctx.user_id, "Partner deleted");
        Ok(())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Partner {id} not found"))
}
