//! Public event listing and registration.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use comhub_core::types::filter::{TextSearch, TimeRange};
use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{EVENT_SORT, EventFilter};
use comhub_entity::event::Event;
use comhub_entity::registration::Registration;

use crate::dto::request::RegisterDto;
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, ListParams, QueryParams, ValidJson};
use crate::state::AppState;

/// Filters of the public event listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    pub q: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EventQuery {
    pub(crate) fn to_filter(&self) -> ApiResult<EventFilter> {
        let range = TimeRange::new(self.from, self.to)?;
        Ok(EventFilter {
            statuses: Vec::new(),
            from: range.from,
            to: range.to,
            search: TextSearch::from_param(self.q.as_deref()),
        })
    }
}

/// GET /api/v1/events
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<EventQuery>,
) -> ApiResult<ApiResponse<PageResponse<Event>>> {
    let sort = list.sort_spec(EVENT_SORT, "e.starts_at", SortDirection::Asc)?;
    let page = state
        .event_service
        .public_list(query.to_filter()?, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Event>> {
    let event = state.event_service.public_get(id).await?;
    Ok(ApiResponse::ok(event))
}

/// POST /api/v1/events/{id}/registrations
///
/// Anonymous callers may register; a signed-in caller is linked to the
/// registration.
pub async fn register(
    State(state): State<AppState>,
    IdPath(event_id): IdPath,
    auth: Option<AuthUser>,
    ValidJson(req): ValidJson<RegisterDto>,
) -> ApiResult<Created<Registration>> {
    let registration = state
        .registration_service
        .register(event_id, req.into(), auth.map(|a| a.user_id))
        .await?;
    Ok(Created(registration))
}
