//! Stock control page: ingredients that need restocking and purchases

use std::sync::Arc;

use shared::models::{Ingredient, IngredientRequest, PurchaseRequest};
use shared::validation::validate_purchase_form;

use super::settle;
use crate::error::ClientResult;
use crate::notify::Notifier;
use crate::services::{IngredientService, Services};

pub struct StockView {
    service: IngredientService,
    notifier: Arc<dyn Notifier>,
    critical: Vec<Ingredient>,
    low: Vec<Ingredient>,
}

impl StockView {
    pub fn new(services: &Services, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service: services.ingredients.clone(),
            notifier,
            critical: Vec::new(),
            low: Vec::new(),
        }
    }

    /// Fetch the critical and low stock lists together
    pub async fn reload(&mut self) -> bool {
        let result = tokio::try_join!(
            self.service.get_critical_stock(),
            self.service.get_low_stock()
        );

        match settle(self.notifier.as_ref(), "Could not load stock", result) {
            Some((critical, low)) => {
                self.critical = critical;
                self.low = low;
                true
            }
            None => false,
        }
    }

    pub fn critical(&self) -> &[Ingredient] {
        &self.critical
    }

    pub fn low(&self) -> &[Ingredient] {
        &self.low
    }

    /// Ingredients needing restock, critical first
    pub fn needing_restock(&self) -> impl Iterator<Item = &Ingredient> {
        self.critical.iter().chain(self.low.iter())
    }

    pub fn total_critical(&self) -> usize {
        self.critical.len()
    }

    pub fn total_low(&self) -> usize {
        self.low.len()
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.low.len()
    }

    /// Record a purchase: optionally store the new purchase price, then add
    /// the purchased quantity to stock and reload the lists.
    pub async fn register_purchase(
        &mut self,
        purchase: &PurchaseRequest,
        update_price: bool,
    ) -> bool {
        let result = self.try_register_purchase(purchase, update_price).await;
        let Some(ingredient) = settle(self.notifier.as_ref(), "Could not register purchase", result)
        else {
            return false;
        };

        tracing::info!(
            ingredient = ingredient.id,
            quantity = %purchase.quantity,
            "Purchase registered"
        );
        self.notifier.success(&format!(
            "Purchase registered: {} now has {} in stock",
            ingredient.name,
            ingredient.current_stock.normalize()
        ));
        self.reload().await;
        true
    }

    async fn try_register_purchase(
        &self,
        purchase: &PurchaseRequest,
        update_price: bool,
    ) -> ClientResult<Ingredient> {
        validate_purchase_form(purchase)?;

        if update_price {
            let current = self.service.get_by_id(purchase.ingredient_id).await?;
            if current.purchase_price != purchase.purchase_price {
                let request = IngredientRequest {
                    purchase_price: purchase.purchase_price,
                    ..IngredientRequest::from(&current)
                };
                self.service
                    .update(purchase.ingredient_id, &request)
                    .await?;
            }
        }

        self.service
            .increment_stock(purchase.ingredient_id, purchase.quantity)
            .await
    }
}
