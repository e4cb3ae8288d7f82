//! Public mentor, partner and roadmap listings.

use axum::extract::State;
use serde::Deserialize;

use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{MENTOR_SORT, MentorFilter, PARTNER_SORT, ROADMAP_SORT};
use comhub_entity::mentor::Mentor;
use comhub_entity::partner::{Partner, PartnerTier};
use comhub_entity::roadmap::{Roadmap, RoadmapWithSteps};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{IdPath, ListParams, QueryParams};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MentorQuery {
    pub q: Option<String>,
    pub expertise: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerQuery {
    pub tier: Option<PartnerTier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/v1/mentors
pub async fn list_mentors(
    State(state): State<AppState>,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<MentorQuery>,
) -> ApiResult<ApiResponse<PageResponse<Mentor>>> {
    let sort = list.sort_spec(MENTOR_SORT, "m.full_name", SortDirection::Asc)?;
    let filter = MentorFilter {
        is_active: None,
        expertise: query.expertise,
        search: TextSearch::from_param(query.q.as_deref()),
    };
    let page = state
        .mentor_service
        .public_list(filter, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/partners
pub async fn list_partners(
    State(state): State<AppState>,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<PartnerQuery>,
) -> ApiResult<ApiResponse<PageResponse<Partner>>> {
    let sort = list.sort_spec(PARTNER_SORT, "p.tier", SortDirection::Asc)?;
    let page = state
        .partner_service
        .public_list(query.tier, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/roadmaps
pub async fn list_roadmaps(
    State(state): State<AppState>,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<ApiResponse<PageResponse<Roadmap>>> {
    let sort = list.sort_spec(ROADMAP_SORT, "r.title", SortDirection::Asc)?;
    let page = state
        .roadmap_service
        .public_list(
            TextSearch::from_param(query.q.as_deref()),
            &sort,
            list.page_request(),
        )
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/roadmaps/{id}
pub async fn get_roadmap(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<RoadmapWithSteps>> {
    let roadmap = state.roadmap_service.public_get(id).await?;
    Ok(ApiResponse::ok(roadmap))
}
