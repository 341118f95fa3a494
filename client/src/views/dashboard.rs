//! Dashboard page
//!
//! Loads every collection it needs concurrently and derives metrics and
//! alerts locally. The load fails as a whole if any fetch fails.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::dashboard::{aggregate, AlertSummary, AlertThresholds, DashboardReport};
use shared::models::{Category, Ingredient, Product};

use super::settle;
use crate::notify::Notifier;
use crate::services::{CategoryService, IngredientService, ProductService, Services};

const DEFAULT_AUTO_REFRESH: Duration = Duration::from_secs(5 * 60);
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(10 * 60);

pub struct DashboardView {
    ingredients_service: IngredientService,
    products_service: ProductService,
    categories_service: CategoryService,
    notifier: Arc<dyn Notifier>,
    thresholds: AlertThresholds,
    auto_refresh: Duration,
    stale_after: Duration,
    ingredients: Vec<Ingredient>,
    products: Vec<Product>,
    categories: Vec<Category>,
    report: DashboardReport,
    last_update: Option<DateTime<Utc>>,
}

impl DashboardView {
    pub fn new(services: &Services, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ingredients_service: services.ingredients.clone(),
            products_service: services.products.clone(),
            categories_service: services.categories.clone(),
            notifier,
            thresholds: AlertThresholds::default(),
            auto_refresh: DEFAULT_AUTO_REFRESH,
            stale_after: DEFAULT_STALE_AFTER,
            ingredients: Vec::new(),
            products: Vec::new(),
            categories: Vec::new(),
            report: DashboardReport::default(),
            last_update: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_timing(mut self, auto_refresh: Duration, stale_after: Duration) -> Self {
        self.auto_refresh = auto_refresh;
        self.stale_after = stale_after;
        self
    }

    pub async fn reload(&mut self) -> bool {
        let result = tokio::try_join!(
            self.ingredients_service.get_all(),
            self.products_service.get_all(),
            self.categories_service.get_main()
        );

        let Some((ingredients, products, categories)) =
            settle(self.notifier.as_ref(), "Could not load the dashboard", result)
        else {
            return false;
        };

        self.report = aggregate(&ingredients, &products, &categories, &self.thresholds);
        self.ingredients = ingredients;
        self.products = products;
        self.categories = categories;
        self.last_update = Some(Utc::now());

        let summary = self.report.summary();
        tracing::info!(
            alerts = summary.total,
            critical = summary.critical,
            "Dashboard refreshed"
        );
        true
    }

    pub fn report(&self) -> &DashboardReport {
        &self.report
    }

    pub fn summary(&self) -> AlertSummary {
        self.report.summary()
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Main categories
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Interval a scheduler should use to call [`DashboardView::reload`]
    pub fn auto_refresh(&self) -> Duration {
        self.auto_refresh
    }

    /// Never loaded, or loaded longer ago than the staleness window
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.last_update {
            None => true,
            Some(at) => {
                let age = now.signed_duration_since(at);
                chrono::Duration::from_std(self.stale_after).map_or(true, |limit| age > limit)
            }
        }
    }
}
