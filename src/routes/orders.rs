use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::orders::{OrderForm, OrderList, OrderWithPositions},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{
        extract::{ApiJson, ApiPath, ApiQuery},
        params::PageQuery,
    },
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order).put(update_order).delete(delete_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<String>, Query, description = "Page number or `last`, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 3"),
    ),
    responses(
        (status = 200, description = "List orders, newest first", body = ApiResponse<OrderList>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Page out of range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order number")
    ),
    responses(
        (status = 200, description = "Order with positions", body = ApiResponse<OrderWithPositions>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<OrderWithPositions>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = OrderForm,
    responses(
        (status = 201, description = "Create order with positions", body = ApiResponse<OrderWithPositions>),
        (status = 403, description = "Missing store.add_order"),
        (status = 422, description = "Invalid order or positions"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(form): ApiJson<OrderForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithPositions>>)> {
    let resp = order_service::create_order(&state, &user, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order number")
    ),
    request_body = OrderForm,
    responses(
        (status = 200, description = "Updated order with positions", body = ApiResponse<OrderWithPositions>),
        (status = 403, description = "Missing store.change_order"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Invalid order or positions"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(form): ApiJson<OrderForm>,
) -> AppResult<Json<ApiResponse<OrderWithPositions>>> {
    let resp = order_service::update_order(&state, &user, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order number")
    ),
    responses(
        (status = 200, description = "Deleted order and its positions"),
        (status = 403, description = "Missing store.delete_order"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}
