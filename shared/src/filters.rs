//! Client-side filtering and sorting of fetched collections
//!
//! Filters are plain structs of optional predicates combined with AND. An
//! unset field matches everything. Filtering never reorders: results keep
//! the order of the source collection. Sorting is a separate, explicit step.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Ingredient, Product, StockState, StockThresholds};
use crate::recipe::{max_preparable, StockLevels};
use crate::types::SortDirection;

/// A predicate over items of type `T`
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Items of `collection` matching `filter`, in source order
pub fn apply_filters<T: Clone, F: Filter<T> + ?Sized>(collection: &[T], filter: &F) -> Vec<T> {
    collection
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Case-insensitive substring match on a trimmed needle; blank needles match
fn name_matches(name: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IngredientFilter {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub is_raw_material: Option<bool>,
    pub stock_state: Option<StockState>,
    #[serde(default)]
    pub critical_only: bool,
    /// Critical or low stock
    #[serde(default)]
    pub needs_restock: bool,
    #[serde(default)]
    pub thresholds: StockThresholds,
}

impl IngredientFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn by_state(state: StockState) -> Self {
        Self {
            stock_state: Some(state),
            ..Self::default()
        }
    }
}

impl Filter<Ingredient> for IngredientFilter {
    fn matches(&self, item: &Ingredient) -> bool {
        if !name_matches(&item.name, self.search.as_deref()) {
            return false;
        }
        if self.category_id.is_some_and(|id| id != item.category_id) {
            return false;
        }
        if self.unit_id.is_some_and(|id| id != item.unit_id) {
            return false;
        }
        if self.is_raw_material.is_some_and(|flag| flag != item.is_raw_material) {
            return false;
        }

        let state = item.stock_state_with(&self.thresholds);
        if self.stock_state.is_some_and(|wanted| wanted != state) {
            return false;
        }
        if self.critical_only && state != StockState::Critical {
            return false;
        }
        if self.needs_restock && !state.needs_restock() {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub max_prep_minutes: Option<u32>,
    pub ingredient_id: Option<i64>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_ingredients: Option<usize>,
    /// Needs stock levels; see [`ProductFilter::with_stock`]
    pub preparable: Option<bool>,
}

impl ProductFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    /// Bind the filter to a stock snapshot so preparability can be evaluated
    pub fn with_stock<'a>(&'a self, stock: &'a StockLevels) -> ProductQuery<'a> {
        ProductQuery {
            filter: self,
            stock,
        }
    }

    fn matches_static(&self, item: &Product) -> bool {
        if !name_matches(&item.name, self.search.as_deref()) {
            return false;
        }
        if self.category_id.is_some_and(|id| id != item.category.id) {
            return false;
        }
        if self.max_prep_minutes.is_some_and(|max| item.prep_minutes > max) {
            return false;
        }
        if self.ingredient_id.is_some_and(|id| !item.uses_ingredient(id)) {
            return false;
        }
        if self.min_price.is_some_and(|min| item.sale_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| item.sale_price > max) {
            return false;
        }
        if self.min_ingredients.is_some_and(|min| item.ingredient_count() < min) {
            return false;
        }
        true
    }
}

/// A [`ProductFilter`] evaluated against current stock
#[derive(Debug, Clone, Copy)]
pub struct ProductQuery<'a> {
    pub filter: &'a ProductFilter,
    pub stock: &'a StockLevels,
}

impl Filter<Product> for ProductQuery<'_> {
    fn matches(&self, item: &Product) -> bool {
        if !self.filter.matches_static(item) {
            return false;
        }
        match self.filter.preparable {
            Some(wanted) => (max_preparable(&item.lines, self.stock) > 0) == wanted,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryFilter {
    pub search: Option<String>,
    #[serde(default)]
    pub top_level_only: bool,
}

impl Filter<Category> for CategoryFilter {
    fn matches(&self, item: &Category) -> bool {
        name_matches(&item.name, self.search.as_deref())
            && (!self.top_level_only || item.is_top_level())
    }
}

/// Stable sort by `key` in the given direction; equal keys keep their order
pub fn sort_by_key<T, K, F>(items: &mut [T], key: F, direction: SortDirection)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| {
        let ordering: Ordering = key(a).cmp(&key(b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
