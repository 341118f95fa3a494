//! Validation rules for back-office forms
//!
//! Single rules return `bool`. Form validators compose them into a
//! [`FormErrors`] map keyed by the wire name of each field, so the messages
//! line up with the payload the backend receives.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::{
    Category, CategoryRequest, Credentials, IngredientRequest, ProductRequest, PurchaseRequest,
    RegisterRequest,
};
use crate::recipe::request_line_errors;

/// Upper bound (exclusive) for any price entered in a form
pub const MAX_PRICE: i64 = 1_000_000;

// ============================================================================
// Field Rules
// ============================================================================

/// Non-blank after trimming
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn has_min_length(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

pub fn has_max_length(value: &str, max: usize) -> bool {
    value.trim().chars().count() <= max
}

pub fn is_numeric(value: &str) -> bool {
    Decimal::from_str(value.trim()).is_ok()
}

pub fn is_positive_number(value: &str) -> bool {
    Decimal::from_str(value.trim()).is_ok_and(|v| v > Decimal::ZERO)
}

pub fn is_integer(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok()
}

/// Inclusive on both ends
pub fn is_in_range(value: Decimal, min: Decimal, max: Decimal) -> bool {
    value >= min && value <= max
}

/// `0 <= current <= max` with a positive maximum
pub fn is_valid_stock(current: Decimal, max: Decimal) -> bool {
    current >= Decimal::ZERO && current <= max && max > Decimal::ZERO
}

pub fn is_valid_price(price: Decimal) -> bool {
    price > Decimal::ZERO && price < Decimal::from(MAX_PRICE)
}

pub fn is_valid_percentage(value: Decimal) -> bool {
    is_in_range(value, Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Same rule the `email` validator applies to the auth forms
pub fn is_valid_email(email: &str) -> bool {
    validator::validate_email(email)
}

// ============================================================================
// Form Errors
// ============================================================================

/// Field name to message map of a rejected form.
///
/// Holds one message per field: the first rule a field breaks is the one
/// reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors {
    fields: BTreeMap<String, String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record `message` when `valid` is false
    pub fn check(&mut self, valid: bool, field: &str, message: &str) {
        if !valid {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, message) in other.fields {
            self.add(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for FormErrors {}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                form.add(field, message);
            }
        }
        form
    }
}

// ============================================================================
// Form Validators
// ============================================================================

fn check_name(errors: &mut FormErrors, field: &str, name: &str) {
    if !is_filled(name) {
        errors.add(field, "Name is required");
    } else if !has_min_length(name, 2) {
        errors.add(field, "Name must have at least 2 characters");
    }
}

pub fn validate_ingredient_form(form: &IngredientRequest) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    check_name(&mut errors, "denominacion", &form.name);

    errors.check(
        form.purchase_price > Decimal::ZERO,
        "precioCompra",
        "Purchase price must be greater than 0",
    );
    errors.check(
        form.sale_price > Decimal::ZERO,
        "precioVenta",
        "Sale price must be greater than 0",
    );
    if form.purchase_price > Decimal::ZERO && form.sale_price > Decimal::ZERO {
        errors.check(
            form.sale_price >= form.purchase_price,
            "precioVenta",
            "Sale price must not be lower than the purchase price",
        );
    }

    errors.check(
        form.current_stock >= Decimal::ZERO,
        "stockActual",
        "Current stock cannot be negative",
    );
    errors.check(
        form.max_stock > Decimal::ZERO,
        "stockMaximo",
        "Maximum stock must be greater than 0",
    );
    if form.max_stock > Decimal::ZERO {
        errors.check(
            form.current_stock <= form.max_stock,
            "stockActual",
            "Current stock cannot exceed the maximum stock",
        );
    }

    errors.check(form.unit_id > 0, "idUnidadMedida", "Select a unit of measure");
    errors.check(form.category_id > 0, "idCategoria", "Select a category");

    errors.into_result()
}

pub fn validate_product_form(form: &ProductRequest) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    check_name(&mut errors, "denominacion", &form.name);
    errors.check(form.category_id > 0, "idCategoria", "Select a category");
    errors.check(
        form.prep_minutes > 0,
        "tiempoEstimadoEnMinutos",
        "Preparation time must be greater than 0",
    );
    errors.check(
        form.sale_price > Decimal::ZERO,
        "precioVenta",
        "Sale price must be greater than 0",
    );
    if let Some(problem) = request_line_errors(&form.lines).into_iter().next() {
        errors.add("detalles", problem.to_string());
    }

    errors.into_result()
}

/// Validate a category form against the categories already known.
///
/// Name uniqueness needs the backend and is checked by the caller.
pub fn validate_category_form(
    form: &CategoryRequest,
    known: &[Category],
) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    check_name(&mut errors, "denominacion", &form.name);

    if form.is_subcategory {
        match form.parent_id {
            None => errors.add("idCategoriaPadre", "A subcategory needs a parent category"),
            Some(parent_id) => match known.iter().find(|c| c.id == parent_id) {
                None => errors.add("idCategoriaPadre", "The parent category does not exist"),
                Some(parent) if parent.is_subcategory => errors.add(
                    "idCategoriaPadre",
                    "A subcategory cannot be the parent of another category",
                ),
                Some(_) => {}
            },
        }
    }

    errors.into_result()
}

pub fn validate_purchase_form(form: &PurchaseRequest) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    errors.check(
        form.quantity > Decimal::ZERO,
        "cantidadComprada",
        "Quantity must be greater than 0",
    );
    errors.check(
        form.purchase_price > Decimal::ZERO,
        "precioCompra",
        "Purchase price must be greater than 0",
    );

    errors.into_result()
}

pub fn validate_credentials(form: &Credentials) -> Result<(), FormErrors> {
    form.validate().map_err(FormErrors::from)
}

pub fn validate_registration(form: &RegisterRequest) -> Result<(), FormErrors> {
    form.validate().map_err(FormErrors::from)
}
