mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use storefront_api::{
    middleware::auth::{AuthUser, Permission, decode_token, ensure_permission},
    routes,
};
use uuid::Uuid;

use common::{JWT_SECRET, offline_state, token_for, user_with};

fn server() -> (TestServer, storefront_api::state::AppState) {
    let state = offline_state();
    let server = TestServer::new(routes::app(state.clone())).expect("test server");
    (server, state)
}

#[test]
fn codenames_round_trip() {
    for permission in Permission::ALL {
        assert_eq!(Permission::from_codename(permission.codename()), Some(permission));
    }
    assert_eq!(Permission::AddOrder.codename(), "store.add_order");
    assert_eq!(Permission::from_codename("store.fly"), None);
}

#[test]
fn admin_role_holds_every_permission() {
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
        permissions: Vec::new(),
    };
    for permission in Permission::ALL {
        assert!(ensure_permission(&admin, permission).is_ok());
    }
}

#[test]
fn plain_user_needs_explicit_grant() {
    let user = user_with(&[Permission::AddTag]);
    assert!(ensure_permission(&user, Permission::AddTag).is_ok());
    assert!(ensure_permission(&user, Permission::DeleteTag).is_err());
}

#[tokio::test]
async fn issued_token_decodes_to_same_user() {
    let state = offline_state();
    let user = user_with(&[Permission::ChangeOrder]);
    let token = token_for(&state, &user);

    let decoded = decode_token(&token, JWT_SECRET).expect("valid token");
    assert_eq!(decoded.user_id, user.user_id);
    assert_eq!(decoded.role, "user");
    assert_eq!(decoded.permissions, vec!["store.change_order".to_string()]);

    assert!(decode_token(&token, "another-secret").is_err());
}

#[tokio::test]
async fn create_without_token_is_unauthorized() {
    let (server, _) = server();
    for path in ["/api/products", "/api/categories", "/api/tags", "/api/orders"] {
        let response = server.post(path).json(&json!({})).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let (server, _) = server();
    let response = server
        .get("/api/orders")
        .authorization_bearer("not-a-jwt")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_permission_is_forbidden() {
    let (server, state) = server();
    let token = token_for(&state, &user_with(&[Permission::AddTag]));

    let response = server
        .post("/api/products")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Mug" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .delete("/api/orders/1")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .put("/api/categories/1")
        .authorization_bearer(&token)
        .json(&json!({ "name": "x", "description": "y" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_category_form_lists_field_errors() {
    let (server, state) = server();
    let token = token_for(&state, &user_with(&[Permission::AddCategory]));

    let response = server
        .post("/api/categories")
        .authorization_bearer(&token)
        .json(&json!({ "name": "" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid form data");
    assert_eq!(body["data"]["fields"]["name"][0], "This field is required.");
    assert_eq!(body["data"]["fields"]["description"][0], "This field is required.");
}

#[tokio::test]
async fn permissions_endpoint_is_admin_only() {
    let (server, state) = server();
    let path = format!("/api/admin/users/{}/permissions", Uuid::new_v4());

    let user_token = token_for(&state, &user_with(&Permission::ALL));
    let response = server
        .put(&path)
        .authorization_bearer(&user_token)
        .json(&json!({ "permissions": [] }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let admin_token = token_for(&state, &common::admin(Uuid::new_v4()));
    let response = server
        .put(&path)
        .authorization_bearer(&admin_token)
        .json(&json!({ "permissions": ["store.add_product", "store.fly"] }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["data"]["fields"]["permissions"][0],
        "Unknown permission store.fly."
    );
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let (server, _) = server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["message"], "Health check");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "down");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (server, _) = server();
    let response = server.get("/nowhere").await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["data"]["path"], "/nowhere");
}

#[tokio::test]
async fn mistyped_body_values_are_field_errors() {
    let (server, state) = server();
    let token = token_for(&state, &common::admin(Uuid::new_v4()));

    let response = server
        .post("/api/products")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Mug", "description": "Ceramic", "price": "abc" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid form data");
    assert_eq!(body["data"]["fields"]["price"][0], "Enter a number.");

    let response = server
        .post("/api/orders")
        .authorization_bearer(&token)
        .json(&json!({
            "delivery_address": "1 Ferris Way",
            "customer_phone": "+100",
            "customer_name": "Ann",
            "positions": [{ "product_id": 1, "quantity": "two", "discount": "0" }]
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["data"]["fields"]["positions[0].quantity"][0],
        "Enter a whole number."
    );
}

#[tokio::test]
async fn malformed_body_is_bad_request_envelope() {
    let (server, state) = server();
    let token = token_for(&state, &common::admin(Uuid::new_v4()));

    let response = server
        .post("/api/tags")
        .authorization_bearer(&token)
        .content_type("application/json")
        .bytes("{ not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"].as_str().is_some_and(|m| m.starts_with("Bad Request")));
}

#[tokio::test]
async fn non_numeric_ids_are_not_found() {
    let (server, state) = server();
    for path in ["/api/products/abc", "/api/categories/abc", "/api/products/category/abc"] {
        let response = server.get(path).await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["message"], "Not Found");
    }

    let token = token_for(&state, &common::admin(Uuid::new_v4()));
    let response = server
        .get("/api/orders/abc")
        .authorization_bearer(&token)
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn mistyped_query_is_bad_request_envelope() {
    let (server, _) = server();
    let response = server.get("/api/products?per_page=lots").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["data"]["error"].is_string());
}

#[tokio::test]
async fn order_pages_require_login() {
    let (server, _) = server();
    for path in ["/api/orders", "/api/orders/1"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
