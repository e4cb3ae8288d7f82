//! Audit log search.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use comhub_core::error::AppError;
use comhub_core::types::filter::TimeRange;
use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::AuditFilter;
use comhub_entity::audit::AuditLogEntry;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ListParams, QueryParams};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub actor_id: Option<Uuid>,
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Audit entries are ordered by time only; `sort` accepts
/// `created_at:asc` or `created_at:desc`.
fn direction(sort: Option<&str>) -> ApiResult<SortDirection> {
    match sort.map(str::trim) {
        None | Some("") | Some("created_at") | Some("created_at:desc") => Ok(SortDirection::Desc),
        Some("created_at:asc") => Ok(SortDirection::Asc),
        Some(other) => Err(AppError::bad_request(format!("Cannot sort audit entries by '{other}'"))
            .with_code("INVALID_SORT")
            .into()),
    }
}

/// GET /api/v1/admin/audit
pub async fn search_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<AuditQuery>,
) -> ApiResult<ApiResponse<PageResponse<AuditLogEntry>>> {
    let range = TimeRange::new(query.from, query.to)?;
    let filter = AuditFilter {
        actor_id: query.actor_id,
        action: query.action,
        target_type: query.target_type,
        target_id: query.target_id,
        from: range.from,
        to: range.to,
    };
    let page = state
        .audit_service
        .search(&auth, &filter, direction(list.sort.as_deref())?, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_sort_is_time_only() {
        assert_eq!(direction(None).unwrap(), SortDirection::Desc);
        assert_eq!(direction(Some("created_at:asc")).unwrap(), SortDirection::Asc);
        let err = direction(Some("action:asc")).unwrap_err();
        assert_eq!(err.0.code, "INVALID_SORT");
    }
}
