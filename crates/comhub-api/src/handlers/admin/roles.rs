//! Role and permission administration.

use axum::extract::State;
use axum::http::StatusCode;

use comhub_entity::rbac::{Permission, Role, RoleWithPermissions};
use comhub_service::rbac::UpdateRoleRequest;

use crate::dto::request::{CreateRoleDto, SetPermissionsRequest};
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, JsonBody, ValidJson};
use crate::state::AppState;

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<RoleWithPermissions>>> {
    Ok(ApiResponse::ok(state.role_service.list(&auth).await?))
}

/// POST /api/v1/admin/roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateRoleDto>,
) -> ApiResult<Created<RoleWithPermissions>> {
    let role = state.role_service.create(&auth, req.into()).await?;
    Ok(Created(role))
}

/// GET /api/v1/admin/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<RoleWithPermissions>> {
    Ok(ApiResponse::ok(state.role_service.get(&auth, id).await?))
}

/// PATCH /api/v1/admin/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UpdateRoleRequest>,
) -> ApiResult<ApiResponse<Role>> {
    Ok(ApiResponse::ok(state.role_service.update(&auth, id, req).await?))
}

/// DELETE /api/v1/admin/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    state.role_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/roles/{id}/permissions
pub async fn set_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<SetPermissionsRequest>,
) -> ApiResult<ApiResponse<RoleWithPermissions>> {
    let role = state
        .role_service
        .set_permissions(&auth, id, req.permissions)
        .await?;
    Ok(ApiResponse::ok(role))
}

/// GET /api/v1/admin/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<Permission>>> {
    Ok(ApiResponse::ok(state.role_service.list_permissions(&auth).await?))
}
