//! Admin user management handlers.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use comhub_core::types::filter::TextSearch;
use comhub_core::types::pagination::PageResponse;
use comhub_core::types::sorting::SortDirection;
use comhub_database::repositories::{USER_SORT, UserFilter};
use comhub_entity::rbac::RoleAssignment;
use comhub_entity::user::User;
use comhub_service::user::{UpdateUserRequest, UserDetail};

use crate::dto::request::{CreateUserDto, ReplaceRolesRequest};
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, JsonBody, ListParams, QueryParams, ValidJson};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub q: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<String>,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(list): QueryParams<ListParams>,
    QueryParams(query): QueryParams<UserQuery>,
) -> ApiResult<ApiResponse<PageResponse<User>>> {
    let sort = list.sort_spec(USER_SORT, "u.created_at", SortDirection::Desc)?;
    let filter = UserFilter {
        search: TextSearch::from_param(query.q.as_deref()),
        is_active: query.is_active,
        role: query.role,
    };
    let page = state
        .admin_user_service
        .list(&auth, &filter, &sort, list.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateUserDto>,
) -> ApiResult<Created<User>> {
    let user = state.admin_user_service.create(&auth, req.into()).await?;
    Ok(Created(user))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<UserDetail>> {
    let user = state.admin_user_service.get(&auth, id).await?;
    Ok(ApiResponse::ok(user))
}

/// PATCH /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state.admin_user_service.update(&auth, id, req).await?;
    Ok(ApiResponse::ok(user))
}

/// POST /api/v1/admin/users/{id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<User>> {
    let user = state.admin_user_service.deactivate(&auth, id).await?;
    Ok(ApiResponse::ok(user))
}

/// PUT /api/v1/admin/users/{id}/roles
pub async fn replace_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<ReplaceRolesRequest>,
) -> ApiResult<ApiResponse<Vec<RoleAssignment>>> {
    let grants = req.roles.into_iter().map(Into::into).collect();
    let roles = state
        .admin_user_service
        .replace_roles(&auth, id, grants)
        .await?;
    Ok(ApiResponse::ok(roles))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    state.admin_user_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
