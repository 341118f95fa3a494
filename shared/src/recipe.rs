//! Recipe costing and stock preparability
//!
//! [`RecipeBuilder`] holds the line list of a product form while it is being
//! edited. Costs are recomputed from the lines on every call; nothing is
//! cached. Preparability is evaluated against a [`StockLevels`] snapshot built
//! from the ingredient collection.

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Ingredient, Product, RecipeLine, RecipeLineRequest};

/// Recipe editing and validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecipeError {
    #[error("The recipe must have at least one ingredient")]
    EmptyRecipe,

    #[error("{ingredient}: quantity must be greater than 0")]
    InvalidQuantity { ingredient: String },

    #[error("{ingredient} is already in the recipe")]
    DuplicateIngredient { ingredient: String },
}

/// Current stock per ingredient id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLevels {
    levels: HashMap<i64, Decimal>,
}

impl StockLevels {
    pub fn from_ingredients(ingredients: &[Ingredient]) -> Self {
        Self {
            levels: ingredients
                .iter()
                .map(|i| (i.id, i.current_stock))
                .collect(),
        }
    }

    pub fn insert(&mut self, ingredient_id: i64, stock: Decimal) {
        self.levels.insert(ingredient_id, stock);
    }

    pub fn get(&self, ingredient_id: i64) -> Option<Decimal> {
        self.levels.get(&ingredient_id).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(i64, Decimal)> for StockLevels {
    fn from_iter<I: IntoIterator<Item = (i64, Decimal)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

/// Result of checking whether a batch can be produced
#[derive(Debug, Clone, PartialEq)]
pub struct StockCheck {
    pub sufficient: bool,
    /// Lines whose ingredient is unknown or short of stock
    pub missing: Vec<RecipeLine>,
}

/// Maximum number of units preparable from `lines` given `stock`.
///
/// The scarcest ingredient bounds the result. An empty recipe, an unknown
/// ingredient, or a non-positive line quantity yields 0.
pub fn max_preparable(lines: &[RecipeLine], stock: &StockLevels) -> u64 {
    if lines.is_empty() {
        return 0;
    }

    let mut minimum: Option<u64> = None;
    for line in lines {
        let units = match stock.get(line.ingredient_id) {
            Some(available) if line.quantity > Decimal::ZERO => {
                if available <= Decimal::ZERO {
                    0
                } else {
                    available
                        .checked_div(line.quantity)
                        .and_then(|ratio| ratio.floor().to_u64())
                        .unwrap_or(u64::MAX)
                }
            }
            _ => 0,
        };
        minimum = Some(minimum.map_or(units, |m| m.min(units)));
    }

    minimum.unwrap_or(0)
}

/// Check every line against the stock needed for `batch` units
pub fn check_stock(lines: &[RecipeLine], stock: &StockLevels, batch: u32) -> StockCheck {
    let batch = Decimal::from(batch);
    let missing: Vec<RecipeLine> = lines
        .iter()
        .filter(|line| match stock.get(line.ingredient_id) {
            Some(available) => available < line.quantity * batch,
            None => true,
        })
        .cloned()
        .collect();

    StockCheck {
        sufficient: missing.is_empty(),
        missing,
    }
}

/// Maximum preparable units of a product
pub fn product_max_preparable(product: &Product, stock: &StockLevels) -> u64 {
    max_preparable(&product.lines, stock)
}

fn line_errors(lines: impl Iterator<Item = (i64, Decimal, String)>) -> Vec<RecipeError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for (ingredient_id, quantity, ingredient) in lines {
        if quantity <= Decimal::ZERO {
            errors.push(RecipeError::InvalidQuantity {
                ingredient: ingredient.clone(),
            });
        }
        if !seen.insert(ingredient_id) {
            errors.push(RecipeError::DuplicateIngredient { ingredient });
        }
    }
    errors
}

/// Problems of the lines of a product payload, in line order.
///
/// Payload lines carry no names, so ingredients are named by id.
pub fn request_line_errors(lines: &[RecipeLineRequest]) -> Vec<RecipeError> {
    if lines.is_empty() {
        return vec![RecipeError::EmptyRecipe];
    }
    line_errors(
        lines
            .iter()
            .map(|l| (l.ingredient_id, l.quantity, format!("Ingredient {}", l.ingredient_id))),
    )
}

/// Convert a percentage markup into a cost multiplier (150% -> 2.5)
pub fn markup_to_multiplier(markup_percent: Decimal) -> Decimal {
    Decimal::ONE + markup_percent / Decimal::ONE_HUNDRED
}

/// In-memory line list of a product recipe being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeBuilder {
    lines: Vec<RecipeLine>,
}

impl RecipeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from an existing product, for the edit form
    pub fn from_product(product: &Product) -> Self {
        Self {
            lines: product.lines.clone(),
        }
    }

    pub fn from_lines(lines: Vec<RecipeLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[RecipeLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, ingredient_id: i64) -> bool {
        self.lines.iter().any(|l| l.ingredient_id == ingredient_id)
    }

    /// Add a line for `ingredient`, snapshotting its purchase price
    pub fn add_line(
        &mut self,
        ingredient: &Ingredient,
        quantity: Decimal,
    ) -> Result<(), RecipeError> {
        if quantity <= Decimal::ZERO {
            return Err(RecipeError::InvalidQuantity {
                ingredient: ingredient.name.clone(),
            });
        }
        if self.contains(ingredient.id) {
            return Err(RecipeError::DuplicateIngredient {
                ingredient: ingredient.name.clone(),
            });
        }

        self.lines.push(RecipeLine {
            detail_id: None,
            ingredient_id: ingredient.id,
            ingredient_name: ingredient.name.clone(),
            unit_name: ingredient.unit_name.clone(),
            unit_price: ingredient.purchase_price,
            quantity,
        });
        Ok(())
    }

    /// Change the quantity of a line; an absent ingredient is a no-op
    pub fn update_line_quantity(
        &mut self,
        ingredient_id: i64,
        quantity: Decimal,
    ) -> Result<(), RecipeError> {
        let line = self.lines.iter_mut().find(|l| l.ingredient_id == ingredient_id);
        if quantity <= Decimal::ZERO {
            return Err(RecipeError::InvalidQuantity {
                ingredient: line.map_or_else(
                    || format!("Ingredient {}", ingredient_id),
                    |l| l.ingredient_name.clone(),
                ),
            });
        }
        if let Some(line) = line {
            line.quantity = quantity;
        }
        Ok(())
    }

    pub fn remove_line(&mut self, ingredient_id: i64) {
        self.lines.retain(|l| l.ingredient_id != ingredient_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total_cost(&self) -> Decimal {
        self.lines.iter().map(RecipeLine::subtotal).sum()
    }

    /// `total_cost * multiplier`, unrounded
    pub fn suggested_price(&self, multiplier: Decimal) -> Decimal {
        self.total_cost() * multiplier
    }

    /// Suggested price rounded up to a whole currency unit.
    ///
    /// `None` unless the recipe has a cost and the multiplier is above 1.
    pub fn rounded_suggested_price(&self, multiplier: Decimal) -> Option<Decimal> {
        let cost = self.total_cost();
        if cost <= Decimal::ZERO || multiplier <= Decimal::ONE {
            return None;
        }
        Some((cost * multiplier).ceil())
    }

    pub fn max_preparable(&self, stock: &StockLevels) -> u64 {
        max_preparable(&self.lines, stock)
    }

    pub fn check_stock(&self, stock: &StockLevels, batch: u32) -> StockCheck {
        check_stock(&self.lines, stock, batch)
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        match self.validation_errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Every validation problem, in line order
    pub fn validation_errors(&self) -> Vec<RecipeError> {
        if self.lines.is_empty() {
            return vec![RecipeError::EmptyRecipe];
        }
        line_errors(
            self.lines
                .iter()
                .map(|l| (l.ingredient_id, l.quantity, l.ingredient_name.clone())),
        )
    }

    pub fn to_detail_requests(&self) -> Vec<RecipeLineRequest> {
        self.lines
            .iter()
            .map(|l| RecipeLineRequest {
                ingredient_id: l.ingredient_id,
                quantity: l.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ingredient(id: i64, name: &str, price: &str, stock: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            sale_price: Decimal::ZERO,
            unit_id: 1,
            unit_name: "g".to_string(),
            category_id: 1,
            category_name: "Secos".to_string(),
            in_subcategory: false,
            parent_category_name: None,
            purchase_price: dec(price),
            current_stock: dec(stock),
            max_stock: dec("100"),
            is_raw_material: true,
            images: vec![],
            used_by_products: 0,
        }
    }

    #[test]
    fn test_add_line_and_total_cost() {
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&ingredient(1, "Harina", "2.5", "10"), dec("4")).unwrap();
        recipe.add_line(&ingredient(2, "Queso", "12", "10"), dec("0.5")).unwrap();
        assert_eq!(recipe.len(), 2);
        assert_eq!(recipe.total_cost(), dec("16"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let flour = ingredient(1, "Harina", "2.5", "10");
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&flour, dec("1")).unwrap();
        let err = recipe.add_line(&flour, dec("2")).unwrap_err();
        assert!(matches!(err, RecipeError::DuplicateIngredient { .. }));
        assert_eq!(recipe.len(), 1);
        assert_eq!(recipe.lines()[0].quantity, dec("1"));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut recipe = RecipeBuilder::new();
        let flour = ingredient(1, "Harina", "2.5", "10");
        assert!(recipe.add_line(&flour, Decimal::ZERO).is_err());
        assert!(recipe.add_line(&flour, dec("-1")).is_err());
        assert!(recipe.is_empty());

        recipe.add_line(&flour, dec("1")).unwrap();
        assert!(recipe.update_line_quantity(1, Decimal::ZERO).is_err());
        assert_eq!(recipe.lines()[0].quantity, dec("1"));
        recipe.update_line_quantity(1, dec("3")).unwrap();
        assert_eq!(recipe.total_cost(), dec("7.5"));
    }

    #[test]
    fn test_update_absent_line() {
        let mut recipe = RecipeBuilder::new();
        assert_eq!(
            recipe.update_line_quantity(42, Decimal::ZERO),
            Err(RecipeError::InvalidQuantity {
                ingredient: "Ingredient 42".to_string()
            })
        );
        assert!(recipe.update_line_quantity(42, dec("-1")).is_err());
        assert_eq!(recipe.update_line_quantity(42, dec("2")), Ok(()));
        assert!(recipe.is_empty());
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&ingredient(1, "Harina", "1", "10"), dec("1")).unwrap();
        recipe.remove_line(42);
        assert_eq!(recipe.len(), 1);
        recipe.remove_line(1);
        assert!(recipe.is_empty());
    }

    #[test]
    fn test_max_preparable_scarcest_ingredient() {
        let a = ingredient(1, "A", "1", "10");
        let b = ingredient(2, "B", "1", "9");
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&a, dec("2")).unwrap();
        recipe.add_line(&b, dec("3")).unwrap();
        let stock = StockLevels::from_ingredients(&[a, b]);
        assert_eq!(recipe.max_preparable(&stock), 3);
    }

    #[test]
    fn test_max_preparable_empty_recipe_is_zero() {
        let stock = StockLevels::from_ingredients(&[ingredient(1, "A", "1", "10")]);
        assert_eq!(RecipeBuilder::new().max_preparable(&stock), 0);
    }

    #[test]
    fn test_max_preparable_missing_ingredient_is_zero() {
        let a = ingredient(1, "A", "1", "10");
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&a, dec("1")).unwrap();
        recipe.add_line(&ingredient(2, "B", "1", "10"), dec("1")).unwrap();
        let stock = StockLevels::from_ingredients(&[a]);
        assert_eq!(recipe.max_preparable(&stock), 0);
    }

    #[test]
    fn test_check_stock_for_batch() {
        let a = ingredient(1, "A", "1", "10");
        let b = ingredient(2, "B", "1", "9");
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&a, dec("2")).unwrap();
        recipe.add_line(&b, dec("3")).unwrap();
        let stock = StockLevels::from_ingredients(&[a, b]);

        assert!(recipe.check_stock(&stock, 3).sufficient);
        let check = recipe.check_stock(&stock, 4);
        assert!(!check.sufficient);
        assert_eq!(check.missing.len(), 1);
        assert_eq!(check.missing[0].ingredient_id, 2);
    }

    #[test]
    fn test_suggested_price() {
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&ingredient(1, "A", "3.3", "10"), dec("1")).unwrap();
        assert_eq!(recipe.suggested_price(dec("2.5")), dec("8.25"));
        assert_eq!(recipe.rounded_suggested_price(dec("2.5")), Some(dec("9")));
        assert_eq!(recipe.rounded_suggested_price(Decimal::ONE), None);
        assert_eq!(RecipeBuilder::new().rounded_suggested_price(dec("2")), None);
        assert_eq!(markup_to_multiplier(dec("150")), dec("2.5"));
    }

    #[test]
    fn test_validate() {
        assert_eq!(RecipeBuilder::new().validate(), Err(RecipeError::EmptyRecipe));
        let mut recipe = RecipeBuilder::new();
        recipe.add_line(&ingredient(1, "A", "1", "10"), dec("1")).unwrap();
        assert!(recipe.validate().is_ok());
        assert_eq!(recipe.to_detail_requests()[0].ingredient_id, 1);
    }

    #[test]
    fn test_request_line_errors() {
        let line = |ingredient_id, quantity: &str| RecipeLineRequest {
            ingredient_id,
            quantity: dec(quantity),
        };
        assert_eq!(request_line_errors(&[]), vec![RecipeError::EmptyRecipe]);
        assert!(request_line_errors(&[line(1, "1"), line(2, "0.5")]).is_empty());

        let errors = request_line_errors(&[line(1, "0"), line(1, "-2")]);
        assert_eq!(
            errors,
            vec![
                RecipeError::InvalidQuantity {
                    ingredient: "Ingredient 1".to_string()
                },
                RecipeError::InvalidQuantity {
                    ingredient: "Ingredient 1".to_string()
                },
                RecipeError::DuplicateIngredient {
                    ingredient: "Ingredient 1".to_string()
                },
            ]
        );
    }
}
