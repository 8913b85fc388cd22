use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dto::products::ProductList,
    error::AppResult,
    response::ApiResponse,
    routes::{extract::ApiQuery, params::PageQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog))
        .route("/all", get(index))
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    params(
        ("page" = Option<String>, Query, description = "Page number; invalid values fall back to the first or last page"),
    ),
    responses(
        (status = 200, description = "One product per page", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn catalog(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::catalog(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/all",
    responses(
        (status = 200, description = "All products", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn index(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::index(&state).await?;
    Ok(Json(resp))
}
