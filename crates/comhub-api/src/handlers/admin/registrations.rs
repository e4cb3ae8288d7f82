//! Registration review: listing per event and the approval workflow.

use axum::extract::State;
use serde::Deserialize;

use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{REGISTRATION_SORT, RegistrationFilter};
use comhub_entity::registration::{Registration, RegistrationStatus};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, ListParams, QueryParams};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationQuery {
    pub status: Option<RegistrationStatus>,
    pub q: Option<String>,
}

/// GET /api/v1/admin/events/{id}/registrations
pub async fn list_for_event(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(event_id): IdPath,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<RegistrationQuery>,
) -> ApiResult<ApiResponse<PageResponse<Registration>>> {
    let sort = list.sort_spec(REGISTRATION_SORT, "r.created_at", SortDirection::Asc)?;
    let filter = RegistrationFilter {
        status: query.status,
        search: TextSearch::from_param(query.q.as_deref()),
    };
    let page = state
        .registration_service
        .list_for_event(&auth, event_id, &filter, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/admin/registrations/{id}
pub async fn get_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Registration>> {
    Ok(ApiResponse::ok(state.registration_service.get(&auth, id).await?))
}

/// POST /api/v1/admin/registrations/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Registration>> {
    Ok(ApiResponse::ok(state.registration_service.approve(&auth, id).await?))
}

/// POST /api/v1/admin/registrations/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Registration>> {
    Ok(ApiResponse::ok(state.registration_service.reject(&auth, id).await?))
}

/// POST /api/v1/admin/registrations/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Registration>> {
    Ok(ApiResponse::ok(state.registration_service.cancel(&auth, id).await?))
}
