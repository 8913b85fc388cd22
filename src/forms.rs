//! Field validation for request payloads.
//!
//! Each form reports every problem it finds, keyed by field name, so a client
//! can show all errors at once. Relation choices (category, tag and product
//! ids) need the database and are checked by the services, which add to the
//! same [`FieldErrors`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{
        catalog::NamedForm,
        orders::{OrderForm, PositionForm},
        products::ProductForm,
    },
    error::{AppError, AppResult},
};

pub const REQUIRED: &str = "This field is required.";

pub const NAME_MAX_LENGTH: usize = 255;
pub const PHONE_MAX_LENGTH: usize = 20;
pub const CUSTOMER_NAME_MAX_LENGTH: usize = 100;

pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;
pub const DISCOUNT_MAX_DIGITS: u32 = 5;
pub const DISCOUNT_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge errors of a sub-form, prefixing each field, e.g. `positions[0].quantity`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Field and message for a body that parsed as JSON but holds a value of the
/// wrong type, from a detail such as
/// `...target type: price: invalid value: string "abc", expected a Decimal ...`.
/// `None` when the error is not tied to a field.
pub fn type_error(detail: &str) -> Option<(String, String)> {
    let (_, detail) = detail.split_once(": ")?;
    let (field, reason) = detail.split_once(": ")?;
    if field.is_empty() || field.contains(' ') {
        return None;
    }
    let message = if reason.contains("Decimal") {
        "Enter a number."
    } else if ["expected i32", "expected i64", "expected u32", "expected u64"]
        .iter()
        .any(|expected| reason.contains(expected))
    {
        "Enter a whole number."
    } else {
        "Enter a valid value."
    };
    Some((field.to_string(), message.to_string()))
}

pub fn invalid_choice(value: impl std::fmt::Display) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

/// Required text, stripped of surrounding whitespace, of at most `max_length` characters.
pub fn validate_text(errors: &mut FieldErrors, field: &str, value: &str, max_length: Option<usize>) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return;
    }
    if let Some(max) = max_length {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
}

/// Digit and decimal place limits of a `NUMERIC(max_digits, decimal_places)` column.
///
/// Digits are counted as written, so trailing zeros after the decimal point
/// count too: `1.500` has three decimal places.
pub fn validate_decimal(
    errors: &mut FieldErrors,
    field: &str,
    value: &Decimal,
    max_digits: u32,
    decimal_places: u32,
) {
    let scale = value.scale();
    let mantissa_digits = value.mantissa().unsigned_abs().to_string().len() as u32;
    let (digits, decimals) = if scale == 0 {
        (mantissa_digits, 0)
    } else if scale > mantissa_digits {
        (scale, scale)
    } else {
        (mantissa_digits, scale)
    };
    let whole_digits = digits - decimals;

    if digits > max_digits {
        errors.add(
            field,
            format!("Ensure that there are no more than {max_digits} digits in total."),
        );
    }
    if decimals > decimal_places {
        errors.add(
            field,
            format!("Ensure that there are no more than {decimal_places} decimal places."),
        );
    }
    if whole_digits > max_digits - decimal_places {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_digits - decimal_places
            ),
        );
    }
}

pub fn validate_min(errors: &mut FieldErrors, field: &str, value: i64, min: i64) {
    if value < min {
        errors.add(
            field,
            format!("Ensure this value is greater than or equal to {min}."),
        );
    }
}

pub fn validate_named(form: &NamedForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_text(&mut errors, "name", &form.name, Some(NAME_MAX_LENGTH));
    validate_text(&mut errors, "description", &form.description, None);
    errors
}

pub fn validate_product(form: &ProductForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_text(&mut errors, "name", &form.name, Some(NAME_MAX_LENGTH));
    validate_text(&mut errors, "description", &form.description, None);
    match &form.price {
        Some(price) => validate_decimal(
            &mut errors,
            "price",
            price,
            PRICE_MAX_DIGITS,
            PRICE_DECIMAL_PLACES,
        ),
        None => errors.add("price", REQUIRED),
    }
    if form.categories.is_empty() {
        errors.add("categories", REQUIRED);
    }
    if form.tags.is_empty() {
        errors.add("tags", REQUIRED);
    }
    errors
}

/// Order header fields only; positions are validated by [`validate_position`].
pub fn validate_order(form: &OrderForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_text(&mut errors, "delivery_address", &form.delivery_address, None);
    validate_text(
        &mut errors,
        "customer_phone",
        &form.customer_phone,
        Some(PHONE_MAX_LENGTH),
    );
    validate_text(
        &mut errors,
        "customer_name",
        &form.customer_name,
        Some(CUSTOMER_NAME_MAX_LENGTH),
    );
    errors
}

/// A position marked for deletion skips field validation.
pub fn validate_position(form: &PositionForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.delete {
        return errors;
    }
    if form.product_id.is_none() {
        errors.add("product_id", REQUIRED);
    }
    match form.quantity {
        Some(quantity) => {
            validate_min(&mut errors, "quantity", quantity, 0);
            if quantity > i32::MAX as i64 {
                errors.add(
                    "quantity",
                    format!("Ensure this value is less than or equal to {}.", i32::MAX),
                );
            }
        }
        None => errors.add("quantity", REQUIRED),
    }
    match &form.discount {
        Some(discount) => validate_decimal(
            &mut errors,
            "discount",
            discount,
            DISCOUNT_MAX_DIGITS,
            DISCOUNT_DECIMAL_PLACES,
        ),
        None => errors.add("discount", REQUIRED),
    }
    errors
}

pub fn position_prefix(index: usize) -> String {
    format!("positions[{index}]")
}
