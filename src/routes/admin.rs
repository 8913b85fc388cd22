use axum::{
    Json, Router,
    extract::State,
    routing::put,
};
use uuid::Uuid;

use crate::{
    dto::auth::{SetPermissionsRequest, UserPermissions},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::extract::{ApiJson, ApiPath},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}/permissions", put(set_user_permissions))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/permissions",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = SetPermissionsRequest,
    responses(
        (status = 200, description = "Replace a user's permissions", body = ApiResponse<UserPermissions>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Unknown permission"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_user_permissions(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SetPermissionsRequest>,
) -> AppResult<Json<ApiResponse<UserPermissions>>> {
    let resp = admin_service::set_user_permissions(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
