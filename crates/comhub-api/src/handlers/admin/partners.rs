//! Partner administration.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{PARTNER_SORT, PartnerFilter};
use comhub_entity::partner::{Partner, PartnerTier};
use comhub_service::community::UpdatePartnerRequest;

use crate::dto::request::CreatePartnerDto;
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, JsonBody, ListParams, QueryParams, ValidJson};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminPartnerQuery {
    pub tier: Option<PartnerTier>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/admin/partners
pub async fn list_partners(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<AdminPartnerQuery>,
) -> ApiResult<ApiResponse<PageResponse<Partner>>> {
    let sort = list.sort_spec(PARTNER_SORT, "p.name", SortDirection::Asc)?;
    let filter = PartnerFilter {
        is_active: query.is_active,
        tier: query.tier,
    };
    let page = state
        .partner_service
        .list(&auth, &filter, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// POST /api/v1/admin/partners
pub async fn create_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreatePartnerDto>,
) -> ApiResult<Created<Partner>> {
    let partner = state.partner_service.create(&auth, req.into()).await?;
    Ok(Created(partner))
}

/// GET /api/v1/admin/partners/{id}
pub async fn get_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Partner>> {
    Ok(ApiResponse::ok(state.partner_service.get(&auth, id).await?))
}

/// PATCH /api/v1/admin/partners/{id}
pub async fn update_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UpdatePartnerRequest>,
) -> ApiResult<ApiResponse<Partner>> {
    Ok(ApiResponse::ok(state.partner_service.update(&auth, id, req).await?))
}

/// DELETE /api/v1/admin/partners/{id}
pub async fn delete_partner(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    state.partner_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
