//! Ingredient list page

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::dashboard::{stock_metrics, StockMetrics};
use shared::filters::{apply_filters, IngredientFilter};
use shared::models::{Ingredient, IngredientRequest, StockAdjustment, StockThresholds, Unit};
use shared::validation::validate_ingredient_form;

use super::settle;
use crate::error::{ClientError, ClientResult};
use crate::notify::Notifier;
use crate::services::{IngredientService, Services, UnitService};

pub struct IngredientsView {
    ingredients_service: IngredientService,
    units_service: UnitService,
    notifier: Arc<dyn Notifier>,
    thresholds: StockThresholds,
    ingredients: Vec<Ingredient>,
    units: Vec<Unit>,
    filter: IngredientFilter,
}

impl IngredientsView {
    pub fn new(services: &Services, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ingredients_service: services.ingredients.clone(),
            units_service: services.units.clone(),
            notifier,
            thresholds: StockThresholds::default(),
            ingredients: Vec::new(),
            units: Vec::new(),
            filter: IngredientFilter::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: StockThresholds) -> Self {
        self.thresholds = thresholds;
        self.filter.thresholds = thresholds;
        self
    }

    /// Fetch ingredients and units of measure together
    pub async fn reload(&mut self) -> bool {
        let result = tokio::try_join!(
            self.ingredients_service.get_all(),
            self.units_service.get_all()
        );

        match settle(self.notifier.as_ref(), "Could not load ingredients", result) {
            Some((ingredients, units)) => {
                tracing::debug!("Loaded {} ingredients", ingredients.len());
                self.ingredients = ingredients;
                self.units = units;
                true
            }
            None => false,
        }
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn find(&self, id: i64) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    pub fn filter(&self) -> &IngredientFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: IngredientFilter) {
        self.filter = IngredientFilter {
            thresholds: self.thresholds,
            ..filter
        };
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(IngredientFilter::default());
    }

    /// Cached ingredients matching the current filter, in load order
    pub fn filtered(&self) -> Vec<Ingredient> {
        apply_filters(&self.ingredients, &self.filter)
    }

    pub fn stock_metrics(&self) -> StockMetrics {
        stock_metrics(&self.ingredients, &self.thresholds)
    }

    pub async fn create(&mut self, form: &IngredientRequest) -> Option<Ingredient> {
        let result = self.try_create(form).await;
        let created = settle(self.notifier.as_ref(), "Could not create ingredient", result)?;
        self.notifier.success(&format!("Ingredient \"{}\" created", created.name));
        self.reload().await;
        Some(created)
    }

    async fn try_create(&self, form: &IngredientRequest) -> ClientResult<Ingredient> {
        let form = form.normalized();
        validate_ingredient_form(&form)?;
        self.ingredients_service.create(&form).await
    }

    pub async fn update(&mut self, id: i64, form: &IngredientRequest) -> Option<Ingredient> {
        let result = self.try_update(id, form).await;
        let updated = settle(self.notifier.as_ref(), "Could not update ingredient", result)?;
        self.notifier.success(&format!("Ingredient \"{}\" updated", updated.name));
        self.reload().await;
        Some(updated)
    }

    async fn try_update(&self, id: i64, form: &IngredientRequest) -> ClientResult<Ingredient> {
        let form = form.normalized();
        validate_ingredient_form(&form)?;
        self.ingredients_service.update(id, &form).await
    }

    /// Delete an ingredient unless a product recipe still uses it
    pub async fn delete(&mut self, id: i64) -> bool {
        let result = self.try_delete(id).await;
        if settle(self.notifier.as_ref(), "Could not delete ingredient", result).is_none() {
            return false;
        }
        self.notifier.success("Ingredient deleted");
        self.reload().await;
        true
    }

    async fn try_delete(&self, id: i64) -> ClientResult<()> {
        if self.ingredients_service.is_used_in_products(id).await? {
            return Err(ClientError::Rejected(
                "The ingredient is used in products and cannot be deleted".to_string(),
            ));
        }
        self.ingredients_service.delete(id).await
    }

    /// Replace the stock of one ingredient and patch the cached row
    pub async fn update_stock(&mut self, id: i64, new_stock: Decimal) -> bool {
        if new_stock < Decimal::ZERO {
            self.notifier.error("Stock cannot be negative");
            return false;
        }

        let result = self.ingredients_service.set_stock(id, new_stock).await;
        let Some(updated) = settle(self.notifier.as_ref(), "Could not update stock", result) else {
            return false;
        };

        match self.ingredients.iter_mut().find(|i| i.id == id) {
            Some(row) => *row = updated,
            None => self.ingredients.push(updated),
        }
        self.notifier.success("Stock updated");
        true
    }

    /// Apply a typed stock edit; increments and decrements reload the list
    pub async fn apply_adjustment(&mut self, id: i64, adjustment: StockAdjustment) -> bool {
        if !adjustment.is_valid() {
            self.notifier.error("Enter a valid quantity");
            return false;
        }
        if let StockAdjustment::Set(value) = adjustment {
            return self.update_stock(id, value).await;
        }

        let result = self.ingredients_service.adjust_stock(id, adjustment).await;
        if settle(self.notifier.as_ref(), "Could not update stock", result).is_none() {
            return false;
        }
        self.notifier.success("Stock updated");
        self.reload().await;
        true
    }
}
