use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::products::{ProductDetail, ProductForm, ProductList, ProductsByCategory, ProductsByTag},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::{
        extract::{ApiJson, ApiPath, ApiQuery},
        params::SearchQuery,
    },
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/category/{category_id}", get(products_by_category))
        .route("/tag/{tag_name}", get(products_by_tag))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("q" = Option<String>, Query, description = "Search in name and description"),
        ("page" = Option<String>, Query, description = "Page number or `last`, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 2"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>),
        (status = 404, description = "Page out of range"),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with related products", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductForm,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing store.add_product"),
        (status = 422, description = "Invalid form data"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(form): ApiJson<ProductForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = ProductForm,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 403, description = "Missing store.change_product"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid form data"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(form): ApiJson<ProductForm>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product"),
        (status = 403, description = "Missing store.delete_product"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/category/{category_id}",
    params(
        ("category_id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Products in the category", body = ApiResponse<ProductsByCategory>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Products"
)]
pub async fn products_by_category(
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<ProductsByCategory>>> {
    let resp = product_service::products_by_category(&state, category_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/tag/{tag_name}",
    params(
        ("tag_name" = String, Path, description = "Exact tag name")
    ),
    responses(
        (status = 200, description = "Products carrying the tag", body = ApiResponse<ProductsByTag>),
        (status = 404, description = "Tag not found"),
    ),
    tag = "Products"
)]
pub async fn products_by_tag(
    State(state): State<AppState>,
    ApiPath(tag_name): ApiPath<String>,
) -> AppResult<Json<ApiResponse<ProductsByTag>>> {
    let resp = product_service::products_by_tag(&state, &tag_name).await?;
    Ok(Json(resp))
}
