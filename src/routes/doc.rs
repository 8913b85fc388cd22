use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, SetPermissionsRequest, UserPermissions},
        catalog::{CategoryDetail, CategoryList, NamedForm, TagList},
        orders::{OrderForm, OrderList, OrderWithPositions, PositionForm},
        products::{ProductDetail, ProductForm, ProductList, ProductsByCategory, ProductsByTag},
    },
    forms::FieldErrors,
    models::{Category, Order, OrderPosition, Product, Tag, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, catalog, categories, health, orders, params, products, tags},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        admin::set_user_permissions,
        catalog::catalog,
        catalog::index,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::products_by_category,
        products::products_by_tag,
        categories::list_categories,
        categories::create_category,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        tags::list_tags,
        tags::create_tag,
        tags::get_tag,
        tags::update_tag,
        tags::delete_tag,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order
    ),
    components(
        schemas(
            User,
            Category,
            Tag,
            Product,
            Order,
            OrderPosition,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            SetPermissionsRequest,
            UserPermissions,
            NamedForm,
            ProductForm,
            OrderForm,
            PositionForm,
            FieldErrors,
            CategoryList,
            CategoryDetail,
            TagList,
            ProductList,
            ProductDetail,
            ProductsByCategory,
            ProductsByTag,
            OrderList,
            OrderWithPositions,
            params::PageQuery,
            params::SearchQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<CategoryList>,
            ApiResponse<TagList>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithPositions>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Storefront catalog"),
        (name = "Products", description = "Product endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Tags", description = "Tag endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
