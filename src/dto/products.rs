use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Product, Tag};

/// Payload for creating or replacing a product.
///
/// Every field defaults so that a missing value surfaces as a field error
/// instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "19.99")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub categories: Vec<i32>,
    #[serde(default)]
    pub tags: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    /// Other products sharing at least one category with this one.
    pub related_products: Vec<Product>,
    /// First category of the product, if any.
    pub category_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductsByCategory {
    pub category: Category,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductsByTag {
    pub tag: Tag,
    pub products: Vec<Product>,
}
