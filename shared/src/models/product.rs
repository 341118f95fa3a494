//! Manufactured product (recipe) models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CategoryInfo;
use crate::types::Image;

/// One ingredient line of a product's bill of materials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    #[serde(
        rename = "idDetalleManufacturado",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub detail_id: Option<i64>,
    #[serde(rename = "idArticuloInsumo")]
    pub ingredient_id: i64,
    #[serde(rename = "denominacionInsumo", default)]
    pub ingredient_name: String,
    #[serde(rename = "unidadMedida", default)]
    pub unit_name: String,
    /// Purchase price snapshot taken when the line was added
    #[serde(rename = "precioCompraUnitario", default)]
    pub unit_price: Decimal,
    #[serde(rename = "cantidad")]
    pub quantity: Decimal,
}

impl RecipeLine {
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Recipe line as sent to the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLineRequest {
    #[serde(rename = "idArticuloInsumo")]
    pub ingredient_id: i64,
    #[serde(rename = "cantidad")]
    pub quantity: Decimal,
}

/// A product prepared in the kitchen from a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "idArticulo")]
    pub id: i64,
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "precioVenta")]
    pub sale_price: Decimal,
    #[serde(rename = "idUnidadMedida", default)]
    pub unit_id: i64,
    #[serde(rename = "denominacionUnidadMedida", default)]
    pub unit_name: String,
    #[serde(rename = "categoria")]
    pub category: CategoryInfo,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "tiempoEstimadoEnMinutos")]
    pub prep_minutes: u32,
    #[serde(rename = "preparacion", default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(rename = "detalles", default)]
    pub lines: Vec<RecipeLine>,
    #[serde(rename = "imagenes", default)]
    pub images: Vec<Image>,
    #[serde(rename = "cantidadVendida", default)]
    pub units_sold: u64,
}

impl Product {
    /// Sum of the recipe line subtotals
    pub fn cost_total(&self) -> Decimal {
        self.lines.iter().map(RecipeLine::subtotal).sum()
    }

    /// `(sale - cost) / cost`, undefined for a zero-cost product or when
    /// the ratio does not fit a `Decimal`
    pub fn margin(&self) -> Option<Decimal> {
        let cost = self.cost_total();
        if cost <= Decimal::ZERO {
            return None;
        }
        self.sale_price.checked_sub(cost)?.checked_div(cost)
    }

    pub fn ingredient_count(&self) -> usize {
        self.lines.len()
    }

    pub fn has_recipe(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn uses_ingredient(&self, ingredient_id: i64) -> bool {
        self.lines.iter().any(|l| l.ingredient_id == ingredient_id)
    }
}

/// Payload for creating or updating a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRequest {
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "idUnidadMedida")]
    pub unit_id: i64,
    #[serde(rename = "idCategoria")]
    pub category_id: i64,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "tiempoEstimadoEnMinutos")]
    pub prep_minutes: u32,
    #[serde(rename = "preparacion", default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(rename = "precioVenta")]
    pub sale_price: Decimal,
    /// Cost multiplier used to suggest the sale price
    #[serde(rename = "margenGanancia", default, skip_serializing_if = "Option::is_none")]
    pub margin_multiplier: Option<Decimal>,
    #[serde(rename = "detalles")]
    pub lines: Vec<RecipeLineRequest>,
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl Default for ProductRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            // "Unidades"
            unit_id: 1,
            category_id: 0,
            description: None,
            prep_minutes: 30,
            instructions: None,
            sale_price: Decimal::ZERO,
            margin_multiplier: Some(Decimal::new(25, 1)),
            lines: Vec::new(),
            image: None,
        }
    }
}

impl ProductRequest {
    /// Trims text fields and drops blank optional ones
    pub fn normalized(&self) -> Self {
        let blank_to_none = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            name: self.name.trim().to_string(),
            description: blank_to_none(&self.description),
            instructions: blank_to_none(&self.instructions),
            ..self.clone()
        }
    }
}

impl From<&Product> for ProductRequest {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            unit_id: product.unit_id,
            category_id: product.category.id,
            description: product.description.clone(),
            prep_minutes: product.prep_minutes,
            instructions: product.instructions.clone(),
            sale_price: product.sale_price,
            margin_multiplier: None,
            lines: product
                .lines
                .iter()
                .map(|l| RecipeLineRequest {
                    ingredient_id: l.ingredient_id,
                    quantity: l.quantity,
                })
                .collect(),
            image: product.images.first().cloned(),
        }
    }
}
