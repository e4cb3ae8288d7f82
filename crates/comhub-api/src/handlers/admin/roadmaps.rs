//! Roadmap administration.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{ROADMAP_SORT, RoadmapFilter};
use comhub_entity::roadmap::{Roadmap, RoadmapWithSteps};
use comhub_service::community::UpdateRoadmapRequest;

use crate::dto::request::{CreateRoadmapDto, ReplaceStepsRequest};
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, JsonBody, ListParams, QueryParams, ValidJson};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminRoadmapQuery {
    pub q: Option<String>,
    pub is_published: Option<bool>,
}

/// GET /api/v1/admin/roadmaps
pub async fn list_roadmaps(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<AdminRoadmapQuery>,
) -> ApiResult<ApiResponse<PageResponse<Roadmap>>> {
    let sort = list.sort_spec(ROADMAP_SORT, "r.updated_at", SortDirection::Desc)?;
    let filter = RoadmapFilter {
        is_published: query.is_published,
        search: TextSearch::from_param(query.q.as_deref()),
    };
    let page = state
        .roadmap_service
        .list(&auth, &filter, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// POST /api/v1/admin/roadmaps
pub async fn create_roadmap(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateRoadmapDto>,
) -> ApiResult<Created<RoadmapWithSteps>> {
    let roadmap = state.roadmap_service.create(&auth, req.into()).await?;
    Ok(Created(roadmap))
}

/// GET /api/v1/admin/roadmaps/{id}
pub async fn get_roadmap(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<RoadmapWithSteps>> {
    Ok(ApiResponse::ok(state.roadmap_service.get(&auth, id).await?))
}

/// PATCH /api/v1/admin/roadmaps/{id}
pub async fn update_roadmap(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UpdateRoadmapRequest>,
) -> ApiResult<ApiResponse<Roadmap>> {
    Ok(ApiResponse::ok(state.roadmap_service.update(&auth, id, req).await?))
}

/// PUT /api/v1/admin/roadmaps/{id}/steps
pub async fn replace_steps(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<ReplaceStepsRequest>,
) -> ApiResult<ApiResponse<RoadmapWithSteps>> {
    let steps = req.steps.into_iter().map(Into::into).collect();
    let roadmap = state.roadmap_service.replace_steps(&auth, id, steps).await?;
    Ok(ApiResponse::ok(roadmap))
}

/// DELETE /api/v1/admin/roadmaps/{id}
pub async fn delete_roadmap(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    state.roadmap_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
