//! Ingredient (insumo) models and stock classification

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Image;

/// An ingredient or resale article tracked in stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    #[serde(rename = "idArticulo")]
    pub id: i64,
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "precioVenta")]
    pub sale_price: Decimal,
    #[serde(rename = "idUnidadMedida")]
    pub unit_id: i64,
    #[serde(rename = "denominacionUnidadMedida", default)]
    pub unit_name: String,
    #[serde(rename = "idCategoria")]
    pub category_id: i64,
    #[serde(rename = "denominacionCategoria", default)]
    pub category_name: String,
    #[serde(rename = "esSubcategoria", default)]
    pub in_subcategory: bool,
    #[serde(
        rename = "denominacionCategoriaPadre",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_category_name: Option<String>,
    #[serde(rename = "precioCompra")]
    pub purchase_price: Decimal,
    #[serde(rename = "stockActual")]
    pub current_stock: Decimal,
    #[serde(rename = "stockMaximo")]
    pub max_stock: Decimal,
    /// Raw material consumed by recipes, as opposed to an article sold as-is
    #[serde(rename = "esParaElaborar")]
    pub is_raw_material: bool,
    #[serde(rename = "imagenes", default)]
    pub images: Vec<Image>,
    #[serde(rename = "cantidadProductosQueLoUsan", default)]
    pub used_by_products: u32,
}

impl Ingredient {
    /// Current stock as a percentage of the maximum stock
    pub fn stock_percentage(&self) -> Decimal {
        stock_percentage(self.current_stock, self.max_stock)
    }

    /// Stock classification using the default thresholds
    pub fn stock_state(&self) -> StockState {
        StockThresholds::default().classify(self.stock_percentage())
    }

    /// Stock classification using custom thresholds
    pub fn stock_state_with(&self, thresholds: &StockThresholds) -> StockState {
        thresholds.classify(self.stock_percentage())
    }

    /// Current stock exceeds the configured maximum
    pub fn is_overstocked(&self) -> bool {
        self.current_stock > self.max_stock
    }

    /// Markup of the sale price over the purchase price, in percent
    pub fn markup_percentage(&self) -> Decimal {
        markup_percentage(self.purchase_price, self.sale_price)
    }
}

/// Compute `current / max * 100`, or zero when the maximum is not positive
pub fn stock_percentage(current: Decimal, max: Decimal) -> Decimal {
    if max <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    current / max * Decimal::ONE_HUNDRED
}

/// Markup of `sale` over `purchase` in percent; zero unless both are positive
pub fn markup_percentage(purchase: Decimal, sale: Decimal) -> Decimal {
    if purchase <= Decimal::ZERO || sale <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (sale - purchase) / purchase * Decimal::ONE_HUNDRED
}

/// Stock classification by percentage of maximum stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StockState {
    #[serde(rename = "CRITICO")]
    Critical,
    #[serde(rename = "BAJO")]
    Low,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "ALTO")]
    High,
}

impl StockState {
    /// Wire code used by the backend
    pub fn code(&self) -> &'static str {
        match self {
            StockState::Critical => "CRITICO",
            StockState::Low => "BAJO",
            StockState::Normal => "NORMAL",
            StockState::High => "ALTO",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CRITICO" | "CRITICAL" => Some(StockState::Critical),
            "BAJO" | "LOW" => Some(StockState::Low),
            "NORMAL" => Some(StockState::Normal),
            "ALTO" | "HIGH" => Some(StockState::High),
            _ => None,
        }
    }

    /// Critical or low stock
    pub fn needs_restock(&self) -> bool {
        matches!(self, StockState::Critical | StockState::Low)
    }
}

impl std::fmt::Display for StockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockState::Critical => write!(f, "Critical"),
            StockState::Low => write!(f, "Low"),
            StockState::Normal => write!(f, "Normal"),
            StockState::High => write!(f, "High"),
        }
    }
}

/// Percentage thresholds separating the stock states.
///
/// Lower bounds are inclusive on the upper band: a percentage equal to
/// `critical` is already LOW, one equal to `low` is NORMAL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StockThresholds {
    pub critical: Decimal,
    pub low: Decimal,
    pub high: Decimal,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            critical: Decimal::from(20),
            low: Decimal::from(40),
            high: Decimal::from(80),
        }
    }
}

impl StockThresholds {
    pub fn classify(&self, percentage: Decimal) -> StockState {
        if percentage < self.critical {
            StockState::Critical
        } else if percentage < self.low {
            StockState::Low
        } else if percentage < self.high {
            StockState::Normal
        } else {
            StockState::High
        }
    }
}

/// Payload for creating or updating an ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientRequest {
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "precioVenta")]
    pub sale_price: Decimal,
    #[serde(rename = "idUnidadMedida")]
    pub unit_id: i64,
    #[serde(rename = "idCategoria")]
    pub category_id: i64,
    #[serde(rename = "precioCompra")]
    pub purchase_price: Decimal,
    #[serde(rename = "stockActual")]
    pub current_stock: Decimal,
    #[serde(rename = "stockMaximo")]
    pub max_stock: Decimal,
    #[serde(rename = "esParaElaborar")]
    pub is_raw_material: bool,
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl Default for IngredientRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            sale_price: Decimal::ZERO,
            unit_id: 0,
            category_id: 0,
            purchase_price: Decimal::ZERO,
            current_stock: Decimal::ZERO,
            max_stock: Decimal::ZERO,
            is_raw_material: true,
            image: None,
        }
    }
}

impl IngredientRequest {
    /// Copy of the request with surrounding whitespace removed from the name
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            ..self.clone()
        }
    }
}

impl From<&Ingredient> for IngredientRequest {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.clone(),
            sale_price: ingredient.sale_price,
            unit_id: ingredient.unit_id,
            category_id: ingredient.category_id,
            purchase_price: ingredient.purchase_price,
            current_stock: ingredient.current_stock,
            max_stock: ingredient.max_stock,
            is_raw_material: ingredient.is_raw_material,
            image: ingredient.images.first().cloned(),
        }
    }
}

/// Payload for registering an ingredient purchase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseRequest {
    #[serde(rename = "idIngrediente")]
    pub ingredient_id: i64,
    #[serde(rename = "precioCompra")]
    pub purchase_price: Decimal,
    #[serde(rename = "cantidadComprada")]
    pub quantity: Decimal,
}

/// A typed stock edit, applied by the ingredient and stock views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Replace the current stock
    Set(Decimal),
    Increment(Decimal),
    Decrement(Decimal),
}

impl StockAdjustment {
    pub fn amount(&self) -> Decimal {
        match self {
            StockAdjustment::Set(v)
            | StockAdjustment::Increment(v)
            | StockAdjustment::Decrement(v) => *v,
        }
    }

    /// Stock level after applying the adjustment to `current`
    pub fn apply(&self, current: Decimal) -> Decimal {
        match self {
            StockAdjustment::Set(v) => *v,
            StockAdjustment::Increment(v) => current + v,
            StockAdjustment::Decrement(v) => current - v,
        }
    }

    /// `Set` accepts zero; increments and decrements must be positive
    pub fn is_valid(&self) -> bool {
        match self {
            StockAdjustment::Set(v) => *v >= Decimal::ZERO,
            StockAdjustment::Increment(v) | StockAdjustment::Decrement(v) => *v > Decimal::ZERO,
        }
    }
}
