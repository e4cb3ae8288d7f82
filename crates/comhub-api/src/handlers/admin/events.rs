//! Event administration.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::EVENT_SORT;
use comhub_entity::event::{Event, EventStatus};
use comhub_service::event::UpdateEventRequest;

use crate::dto::request::{ChangeStatusRequest, CreateEventDto};
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, JsonBody, ListParams, QueryParams, ValidJson};
use crate::handlers::events::EventQuery;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<EventStatus>,
}

/// GET /api/v1/admin/events
pub async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<EventQuery>,
    QueryParams(status): QueryParams<StatusQuery>,
) -> ApiResult<ApiResponse<PageResponse<Event>>> {
    let sort = list.sort_spec(EVENT_SORT, "e.starts_at", SortDirection::Desc)?;
    let mut filter = query.to_filter()?;
    filter.statuses = status.status.into_iter().collect();
    let page = state
        .event_service
        .list(&auth, &filter, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// POST /api/v1/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateEventDto>,
) -> ApiResult<Created<Event>> {
    let event = state.event_service.create(&auth, req.into()).await?;
    Ok(Created(event))
}

/// GET /api/v1/admin/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Event>> {
    Ok(ApiResponse::ok(state.event_service.get(&auth, id).await?))
}

/// PATCH /api/v1/admin/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UpdateEventRequest>,
) -> ApiResult<ApiResponse<Event>> {
    Ok(ApiResponse::ok(state.event_service.update(&auth, id, req).await?))
}

/// PUT /api/v1/admin/events/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<ChangeStatusRequest>,
) -> ApiResult<ApiResponse<Event>> {
    let event = state
        .event_service
        .change_status(&auth, id, req.status)
        .await?;
    Ok(ApiResponse::ok(event))
}

/// DELETE /api/v1/admin/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    state.event_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
