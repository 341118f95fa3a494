//! WebAssembly module for the Buen Sabor back-office
//!
//! Provides client-side computation for:
//! - Recipe costing and price suggestions
//! - Stock classification and preparability
//! - Dashboard alerts and metrics
//! - Form validation and display formatting
//!
//! Collections cross the boundary as JSON strings in the backend's wire
//! format, so the browser can hand over API responses untouched.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use shared::dashboard::{aggregate, AlertSummary, AlertThresholds};
use shared::filters::{apply_filters, IngredientFilter, ProductFilter};
use shared::format;
use shared::models::{
    stock_percentage, Category, Ingredient, IngredientRequest, Product, ProductRequest, RecipeLine,
    StockThresholds,
};
use shared::recipe::{self, RecipeBuilder, StockLevels};
use shared::validation::{self, FormErrors};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("buen-sabor-wasm loaded"));
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_decimal(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&value.to_string()).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn form_result(result: Result<(), FormErrors>) -> Result<String, JsValue> {
    match result {
        Ok(()) => Ok("{}".to_string()),
        Err(errors) => to_json(&errors),
    }
}

// ============================================================================
// Recipe
// ============================================================================

/// Total cost of a list of recipe lines
#[wasm_bindgen]
pub fn recipe_cost(lines_json: &str) -> Result<f64, JsValue> {
    let lines: Vec<RecipeLine> = parse(lines_json, "recipe lines")?;
    Ok(to_f64(lines.iter().map(RecipeLine::subtotal).sum()))
}

/// Suggested sale price rounded up, or `undefined` when not applicable
#[wasm_bindgen]
pub fn suggested_price(lines_json: &str, multiplier: f64) -> Result<Option<f64>, JsValue> {
    let lines: Vec<RecipeLine> = parse(lines_json, "recipe lines")?;
    let recipe = RecipeBuilder::from_lines(lines);
    Ok(recipe.rounded_suggested_price(to_decimal(multiplier)).map(to_f64))
}

#[wasm_bindgen]
pub fn markup_to_multiplier(markup_percent: f64) -> f64 {
    to_f64(recipe::markup_to_multiplier(to_decimal(markup_percent)))
}

/// Units preparable from the recipe given the ingredients' stock
#[wasm_bindgen]
pub fn max_preparable(lines_json: &str, ingredients_json: &str) -> Result<u32, JsValue> {
    let lines: Vec<RecipeLine> = parse(lines_json, "recipe lines")?;
    let ingredients: Vec<Ingredient> = parse(ingredients_json, "ingredients")?;
    let units = recipe::max_preparable(&lines, &StockLevels::from_ingredients(&ingredients));
    Ok(u32::try_from(units).unwrap_or(u32::MAX))
}

/// Stock check for a batch, as `{ "sufficient": bool, "missing": [ids] }`
#[wasm_bindgen]
pub fn check_stock(
    lines_json: &str,
    ingredients_json: &str,
    batch: u32,
) -> Result<String, JsValue> {
    let lines: Vec<RecipeLine> = parse(lines_json, "recipe lines")?;
    let ingredients: Vec<Ingredient> = parse(ingredients_json, "ingredients")?;
    let check = recipe::check_stock(&lines, &StockLevels::from_ingredients(&ingredients), batch);
    let missing: Vec<i64> = check.missing.iter().map(|l| l.ingredient_id).collect();
    to_json(&serde_json::json!({
        "sufficient": check.sufficient,
        "missing": missing,
    }))
}

// ============================================================================
// Stock & Dashboard
// ============================================================================

#[wasm_bindgen]
pub fn calculate_stock_percentage(current: f64, max: f64) -> f64 {
    to_f64(stock_percentage(to_decimal(current), to_decimal(max)))
}

/// Stock state code (`CRITICO`, `BAJO`, `NORMAL`, `ALTO`)
#[wasm_bindgen]
pub fn classify_stock(current: f64, max: f64) -> String {
    let percentage = stock_percentage(to_decimal(current), to_decimal(max));
    StockThresholds::default().classify(percentage).code().to_string()
}

/// Full dashboard report plus its alert summary.
///
/// `categories_json` holds the main categories.
#[wasm_bindgen]
pub fn build_dashboard(
    ingredients_json: &str,
    products_json: &str,
    categories_json: &str,
) -> Result<String, JsValue> {
    let ingredients: Vec<Ingredient> = parse(ingredients_json, "ingredients")?;
    let products: Vec<Product> = parse(products_json, "products")?;
    let categories: Vec<Category> = parse(categories_json, "categories")?;
    let report = aggregate(&ingredients, &products, &categories, &AlertThresholds::default());
    let summary = AlertSummary::from_report(&report);
    to_json(&serde_json::json!({
        "report": report,
        "summary": summary,
    }))
}

#[wasm_bindgen]
pub fn filter_ingredients(ingredients_json: &str, filter_json: &str) -> Result<String, JsValue> {
    let ingredients: Vec<Ingredient> = parse(ingredients_json, "ingredients")?;
    let filter: IngredientFilter = parse(filter_json, "filter")?;
    to_json(&apply_filters(&ingredients, &filter))
}

#[wasm_bindgen]
pub fn filter_products(
    products_json: &str,
    ingredients_json: &str,
    filter_json: &str,
) -> Result<String, JsValue> {
    let products: Vec<Product> = parse(products_json, "products")?;
    let ingredients: Vec<Ingredient> = parse(ingredients_json, "ingredients")?;
    let filter: ProductFilter = parse(filter_json, "filter")?;
    let stock = StockLevels::from_ingredients(&ingredients);
    to_json(&apply_filters(&products, &filter.with_stock(&stock)))
}

// ============================================================================
// Validation
// ============================================================================

/// Field errors of an ingredient form; `{}` when valid
#[wasm_bindgen]
pub fn validate_ingredient(form_json: &str) -> Result<String, JsValue> {
    let form: IngredientRequest = parse(form_json, "ingredient form")?;
    form_result(validation::validate_ingredient_form(&form))
}

#[wasm_bindgen]
pub fn validate_product(form_json: &str) -> Result<String, JsValue> {
    let form: ProductRequest = parse(form_json, "product form")?;
    form_result(validation::validate_product_form(&form))
}

#[wasm_bindgen]
pub fn is_valid_email(email: &str) -> bool {
    validation::is_valid_email(email)
}

// ============================================================================
// Formatting
// ============================================================================

#[wasm_bindgen]
pub fn format_currency(amount: f64) -> String {
    format::format_currency(to_decimal(amount))
}

#[wasm_bindgen]
pub fn format_number(value: f64) -> String {
    format::format_number(to_decimal(value))
}

#[wasm_bindgen]
pub fn format_percentage(value: f64) -> String {
    format::format_percentage(to_decimal(value))
}

/// Relative time between two epoch timestamps in milliseconds
#[wasm_bindgen]
pub fn format_relative_time_between(then_ms: f64, now_ms: f64) -> String {
    use chrono::{TimeZone, Utc};

    let at = |ms: f64| Utc.timestamp_millis_opt(ms as i64).single();
    match (at(then_ms), at(now_ms)) {
        (Some(then), Some(now)) => format::format_relative_time(then, now),
        _ => String::new(),
    }
}

/// Relative time from an epoch timestamp in milliseconds to now
#[wasm_bindgen]
pub fn format_relative_time(then_ms: f64) -> String {
    format_relative_time_between(then_ms, js_sys::Date::now())
}

#[wasm_bindgen]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    format::truncate_text(text, max_chars)
}
