//! Mentor administration.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{MENTOR_SORT, MentorFilter};
use comhub_entity::mentor::Mentor;
use comhub_service::community::UpdateMentorRequest;

use crate::dto::request::CreateMentorDto;
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, JsonBody, ListParams, QueryParams, ValidJson};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminMentorQuery {
    pub q: Option<String>,
    pub expertise: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/admin/mentors
pub async fn list_mentors(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<AdminMentorQuery>,
) -> ApiResult<ApiResponse<PageResponse<Mentor>>> {
    let sort = list.sort_spec(MENTOR_SORT, "m.created_at", SortDirection::Desc)?;
    let filter = MentorFilter {
        is_active: query.is_active,
        expertise: query.expertise,
        search: TextSearch::from_param(query.q.as_deref()),
    };
    let page = state
        .mentor_service
        .list(&auth, &filter, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// POST /api/v1/admin/mentors
pub async fn create_mentor(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateMentorDto>,
) -> ApiResult<Created<Mentor>> {
    let mentor = state.mentor_service.create(&auth, req.into()).await?;
    Ok(Created(mentor))
}

/// GET /api/v1/admin/mentors/{id}
pub async fn get_mentor(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Mentor>> {
    Ok(ApiResponse::ok(state.mentor_service.get(&auth, id).await?))
}

/// PATCH /api/v1/admin/mentors/{id}
pub async fn update_mentor(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UpdateMentorRequest>,
) -> ApiResult<ApiResponse<Mentor>> {
    Ok(ApiResponse::ok(state.mentor_service.update(&auth, id, req).await?))
}

/// DELETE /api/v1/admin/mentors/{id}
pub async fn delete_mentor(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    state.mentor_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
