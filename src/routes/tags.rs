use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::catalog::{TagForm, TagList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Tag,
    response::ApiResponse,
    routes::{
        extract::{ApiJson, ApiPath, ApiQuery},
        params::SearchQuery,
    },
    services::tag_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route("/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(
        ("q" = Option<String>, Query, description = "Search in name and description"),
        ("page" = Option<String>, Query, description = "Page number or `last`, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 2"),
    ),
    responses(
        (status = 200, description = "List tags", body = ApiResponse<TagList>),
        (status = 404, description = "Page out of range"),
    ),
    tag = "Tags"
)]
pub async fn list_tags(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Json<ApiResponse<TagList>>> {
    let resp = tag_service::list_tags(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Get tag", body = ApiResponse<Tag>),
        (status = 404, description = "Tag not found"),
    ),
    tag = "Tags"
)]
pub async fn get_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<Tag>>> {
    let resp = tag_service::get_tag(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TagForm,
    responses(
        (status = 201, description = "Create tag", body = ApiResponse<Tag>),
        (status = 403, description = "Missing store.add_tag"),
        (status = 422, description = "Invalid form data"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(form): ApiJson<TagForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<Tag>>)> {
    let resp = tag_service::create_tag(&state, &user, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    request_body = TagForm,
    responses(
        (status = 200, description = "Updated tag", body = ApiResponse<Tag>),
        (status = 403, description = "Missing store.change_tag"),
        (status = 404, description = "Tag not found"),
        (status = 422, description = "Invalid form data"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn update_tag(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(form): ApiJson<TagForm>,
) -> AppResult<Json<ApiResponse<Tag>>> {
    let resp = tag_service::update_tag(&state, &user, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Deleted tag"),
        (status = 403, description = "Missing store.delete_tag"),
        (status = 404, description = "Tag not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = tag_service::delete_tag(&state, &user, id).await?;
    Ok(Json(resp))
}
