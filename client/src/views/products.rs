//! Product list page and recipe editing

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::dashboard::{product_metrics, ProductMetrics};
use shared::filters::{apply_filters, ProductFilter};
use shared::models::{Ingredient, Product, ProductRequest};
use shared::recipe::{RecipeBuilder, StockLevels};
use shared::validation::validate_product_form;

use super::settle;
use crate::error::{ClientError, ClientResult};
use crate::notify::Notifier;
use crate::services::{IngredientService, ProductService, Services};

pub struct ProductsView {
    products_service: ProductService,
    ingredients_service: IngredientService,
    notifier: Arc<dyn Notifier>,
    default_multiplier: Decimal,
    products: Vec<Product>,
    ingredients: Vec<Ingredient>,
    filter: ProductFilter,
}

impl ProductsView {
    pub fn new(services: &Services, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            products_service: services.products.clone(),
            ingredients_service: services.ingredients.clone(),
            notifier,
            default_multiplier: Decimal::new(25, 1),
            products: Vec::new(),
            ingredients: Vec::new(),
            filter: ProductFilter::default(),
        }
    }

    pub fn with_default_multiplier(mut self, multiplier: Decimal) -> Self {
        self.default_multiplier = multiplier;
        self
    }

    /// Fetch products and the ingredients their preparability depends on
    pub async fn reload(&mut self) -> bool {
        let result = tokio::try_join!(
            self.products_service.get_all(),
            self.ingredients_service.get_all()
        );

        match settle(self.notifier.as_ref(), "Could not load products", result) {
            Some((products, ingredients)) => {
                tracing::debug!("Loaded {} products", products.len());
                self.products = products;
                self.ingredients = ingredients;
                true
            }
            None => false,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Ingredients available for recipes
    pub fn ingredients(&self) -> Vec<&Ingredient> {
        self.ingredients.iter().filter(|i| i.is_raw_material).collect()
    }

    pub fn find(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn default_multiplier(&self) -> Decimal {
        self.default_multiplier
    }

    pub fn stock_levels(&self) -> StockLevels {
        StockLevels::from_ingredients(&self.ingredients)
    }

    pub fn filter(&self) -> &ProductFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ProductFilter) {
        self.filter = filter;
    }

    pub fn clear_filter(&mut self) {
        self.filter = ProductFilter::default();
    }

    /// Cached products matching the current filter against current stock
    pub fn filtered(&self) -> Vec<Product> {
        let stock = self.stock_levels();
        apply_filters(&self.products, &self.filter.with_stock(&stock))
    }

    pub fn metrics(&self) -> ProductMetrics {
        product_metrics(&self.products, &self.stock_levels())
    }

    pub fn max_preparable(&self, id: i64) -> Option<u64> {
        let stock = self.stock_levels();
        self.find(id)
            .map(|p| RecipeBuilder::from_product(p).max_preparable(&stock))
    }

    /// Recipe editor seeded from an existing product, or empty for a new one
    pub fn recipe_builder(&self, product_id: Option<i64>) -> RecipeBuilder {
        product_id
            .and_then(|id| self.find(id))
            .map(RecipeBuilder::from_product)
            .unwrap_or_default()
    }

    /// Suggested sale price for a recipe at the default multiplier
    pub fn suggested_price(&self, recipe: &RecipeBuilder) -> Option<Decimal> {
        recipe.rounded_suggested_price(self.default_multiplier)
    }

    /// Fill the form's recipe lines from the editor
    pub fn with_recipe(&self, form: &ProductRequest, recipe: &RecipeBuilder) -> ProductRequest {
        ProductRequest {
            lines: recipe.to_detail_requests(),
            margin_multiplier: form.margin_multiplier.or(Some(self.default_multiplier)),
            ..form.clone()
        }
    }

    pub async fn create(&mut self, form: &ProductRequest) -> Option<Product> {
        let result = self.try_create(form).await;
        let created = settle(self.notifier.as_ref(), "Could not create product", result)?;
        self.notifier.success(&format!("Product \"{}\" created", created.name));
        self.reload().await;
        Some(created)
    }

    async fn try_create(&self, form: &ProductRequest) -> ClientResult<Product> {
        let form = form.normalized();
        validate_product_form(&form)?;
        self.products_service.create(&form).await
    }

    pub async fn update(&mut self, id: i64, form: &ProductRequest) -> Option<Product> {
        let result = self.try_update(id, form).await;
        let updated = settle(self.notifier.as_ref(), "Could not update product", result)?;
        self.notifier.success(&format!("Product \"{}\" updated", updated.name));
        self.reload().await;
        Some(updated)
    }

    async fn try_update(&self, id: i64, form: &ProductRequest) -> ClientResult<Product> {
        let form = form.normalized();
        validate_product_form(&form)?;
        self.products_service.update(id, &form).await
    }

    /// Delete a product unless it appears in orders
    pub async fn delete(&mut self, id: i64) -> bool {
        let result = self.try_delete(id).await;
        if settle(self.notifier.as_ref(), "Could not delete product", result).is_none() {
            return false;
        }
        self.notifier.success("Product deleted");
        self.reload().await;
        true
    }

    async fn try_delete(&self, id: i64) -> ClientResult<()> {
        if self.products_service.is_used_in_orders(id).await? {
            return Err(ClientError::Rejected(
                "The product appears in orders and cannot be deleted".to_string(),
            ));
        }
        self.products_service.delete(id).await
    }
}
