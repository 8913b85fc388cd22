use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Product, Tag};

/// Shared shape of the category and tag forms.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct NamedForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub type CategoryForm = NamedForm;
pub type TagForm = NamedForm;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TagList {
    #[schema(value_type = Vec<Tag>)]
    pub items: Vec<Tag>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetail {
    pub category: Category,
    pub related_products: Vec<Product>,
}
