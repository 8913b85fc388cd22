use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderPosition};

/// One entry of the order positions formset.
///
/// Entries without an `id` are new positions; entries with an `id` address an
/// existing position of the order and are updated, or removed when `delete`
/// is set. A new entry with no product, quantity or discount is blank and
/// skipped.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PositionForm {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub product_id: Option<i32>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "0.00")]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub delete: bool,
}

impl PositionForm {
    pub fn is_blank(&self) -> bool {
        self.id.is_none()
            && self.product_id.is_none()
            && self.quantity.is_none()
            && self.discount.is_none()
    }
}

/// Order form together with its positions formset.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct OrderForm {
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub positions: Vec<PositionForm>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithPositions {
    pub order: Order,
    pub positions: Vec<OrderPosition>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
