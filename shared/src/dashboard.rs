//! Alert and metrics aggregation for the dashboard
//!
//! Everything here is derived from already-fetched collections. The
//! aggregation is a pure function so the same report can be produced by the
//! client, the CLI and the browser binding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Ingredient, Product, StockState, StockThresholds};
use crate::recipe::{max_preparable, StockLevels};
use crate::types::Priority;

/// Thresholds driving stock classification and margin alerts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertThresholds {
    /// Stock percentage below which an ingredient is critical
    pub critical: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    /// Minimum acceptable `(sale - cost) / cost` ratio
    pub min_margin: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        let stock = StockThresholds::default();
        Self {
            critical: stock.critical,
            low: stock.low,
            high: stock.high,
            min_margin: Decimal::new(20, 2),
        }
    }
}

impl AlertThresholds {
    pub fn stock(&self) -> StockThresholds {
        StockThresholds {
            critical: self.critical,
            low: self.low,
            high: self.high,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockAlertKind {
    Critical,
    Low,
}

/// An ingredient whose stock needs attention
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockAlert {
    pub kind: StockAlertKind,
    pub priority: Priority,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub current_stock: Decimal,
    pub max_stock: Decimal,
    pub percentage: Decimal,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductAlertKind {
    NotPreparable,
    NoRecipe,
    ThinMargin,
}

/// A product that cannot be sold as expected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductAlert {
    pub kind: ProductAlertKind,
    pub priority: Priority,
    pub product_id: i64,
    pub product_name: String,
    pub message: String,
}

/// Ingredient counts per stock state
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockMetrics {
    pub critical: usize,
    pub low: usize,
    pub normal: usize,
    pub high: usize,
    /// Ingredients whose current stock exceeds the maximum
    pub overstocked: usize,
}

impl StockMetrics {
    pub fn total(&self) -> usize {
        self.critical + self.low + self.normal + self.high
    }

    fn record(&mut self, state: StockState) {
        match state {
            StockState::Critical => self.critical += 1,
            StockState::Low => self.low += 1,
            StockState::Normal => self.normal += 1,
            StockState::High => self.high += 1,
        }
    }
}

pub fn stock_metrics(ingredients: &[Ingredient], thresholds: &StockThresholds) -> StockMetrics {
    let mut metrics = StockMetrics::default();
    for ingredient in ingredients {
        metrics.record(ingredient.stock_state_with(thresholds));
        if ingredient.is_overstocked() {
            metrics.overstocked += 1;
        }
    }
    metrics
}

/// Preparability and cost figures over a product collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductMetrics {
    pub total: usize,
    pub preparable: usize,
    /// Products with a recipe that cannot be made right now
    pub non_preparable: usize,
    pub without_recipe: usize,
    /// Mean recipe cost over products that have a recipe
    pub average_cost: Decimal,
}

pub fn product_metrics(products: &[Product], stock: &StockLevels) -> ProductMetrics {
    let with_recipe: Vec<&Product> = products.iter().filter(|p| p.has_recipe()).collect();
    let preparable = with_recipe
        .iter()
        .filter(|p| max_preparable(&p.lines, stock) > 0)
        .count();

    let average_cost = if with_recipe.is_empty() {
        Decimal::ZERO
    } else {
        let total: Decimal = with_recipe.iter().map(|p| p.cost_total()).sum();
        (total / Decimal::from(with_recipe.len())).round_dp(2)
    };

    ProductMetrics {
        total: products.len(),
        preparable,
        non_preparable: with_recipe.len() - preparable,
        without_recipe: products.len() - with_recipe.len(),
        average_cost,
    }
}

/// Headline numbers of the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_ingredients: usize,
    pub critical_ingredients: usize,
    pub low_ingredients: usize,
    pub total_products: usize,
    pub preparable_products: usize,
    pub non_preparable_products: usize,
    pub products_without_recipe: usize,
    /// Mean recipe cost over products that have a recipe
    pub average_product_cost: Decimal,
    /// Main categories currently defined
    pub active_categories: usize,
    pub stock: StockMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardReport {
    pub metrics: DashboardMetrics,
    pub stock_alerts: Vec<StockAlert>,
    pub product_alerts: Vec<ProductAlert>,
}

/// Alert counts shown in the dashboard header
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSummary {
    pub total: usize,
    /// Alerts of high priority across both lists
    pub critical: usize,
    pub stock: usize,
    pub products: usize,
}

impl AlertSummary {
    pub fn from_report(report: &DashboardReport) -> Self {
        let critical = report
            .stock_alerts
            .iter()
            .filter(|a| a.priority == Priority::High)
            .count()
            + report
                .product_alerts
                .iter()
                .filter(|a| a.priority == Priority::High)
                .count();

        Self {
            total: report.stock_alerts.len() + report.product_alerts.len(),
            critical,
            stock: report.stock_alerts.len(),
            products: report.product_alerts.len(),
        }
    }
}

impl DashboardReport {
    pub fn summary(&self) -> AlertSummary {
        AlertSummary::from_report(self)
    }

    pub fn has_alerts(&self) -> bool {
        !self.stock_alerts.is_empty() || !self.product_alerts.is_empty()
    }
}

/// Stock alerts, critical first then low, each tier in source order
pub fn stock_alerts(ingredients: &[Ingredient], thresholds: &AlertThresholds) -> Vec<StockAlert> {
    let stock = thresholds.stock();
    let tier = |wanted: StockState| {
        ingredients
            .iter()
            .filter(move |i| i.stock_state_with(&stock) == wanted)
            .map(move |i| stock_alert(i, wanted))
    };

    tier(StockState::Critical)
        .chain(tier(StockState::Low))
        .flatten()
        .collect()
}

fn stock_alert(ingredient: &Ingredient, state: StockState) -> Option<StockAlert> {
    let (kind, priority, label) = match state {
        StockState::Critical => (StockAlertKind::Critical, Priority::High, "critical"),
        StockState::Low => (StockAlertKind::Low, Priority::Medium, "low"),
        _ => return None,
    };

    Some(StockAlert {
        kind,
        priority,
        ingredient_id: ingredient.id,
        ingredient_name: ingredient.name.clone(),
        current_stock: ingredient.current_stock,
        max_stock: ingredient.max_stock,
        percentage: ingredient.stock_percentage().round_dp(1),
        message: format!(
            "{} has {} stock ({}/{})",
            ingredient.name,
            label,
            ingredient.current_stock.normalize(),
            ingredient.max_stock.normalize()
        ),
    })
}

/// Product alerts: not preparable, then without recipe, then thin margin
pub fn product_alerts(
    products: &[Product],
    stock: &StockLevels,
    thresholds: &AlertThresholds,
) -> Vec<ProductAlert> {
    let mut alerts = Vec::new();

    for product in products.iter().filter(|p| p.has_recipe()) {
        if max_preparable(&product.lines, stock) == 0 {
            alerts.push(ProductAlert {
                kind: ProductAlertKind::NotPreparable,
                priority: Priority::High,
                product_id: product.id,
                product_name: product.name.clone(),
                message: format!("{} cannot be prepared with the current stock", product.name),
            });
        }
    }

    for product in products.iter().filter(|p| !p.has_recipe()) {
        alerts.push(ProductAlert {
            kind: ProductAlertKind::NoRecipe,
            priority: Priority::Medium,
            product_id: product.id,
            product_name: product.name.clone(),
            message: format!("{} has no recipe", product.name),
        });
    }

    for product in products {
        let Some(margin) = product.margin() else {
            continue;
        };
        if margin < thresholds.min_margin {
            alerts.push(ProductAlert {
                kind: ProductAlertKind::ThinMargin,
                priority: Priority::Low,
                product_id: product.id,
                product_name: product.name.clone(),
                message: format!(
                    "{} has a thin margin ({}%)",
                    product.name,
                    (margin * Decimal::ONE_HUNDRED).round_dp(0)
                ),
            });
        }
    }

    alerts
}

/// Compute metrics and alert lists from the fetched collections.
///
/// `categories` is the list of main categories; each one counts as active.
pub fn aggregate(
    ingredients: &[Ingredient],
    products: &[Product],
    categories: &[Category],
    thresholds: &AlertThresholds,
) -> DashboardReport {
    let levels = StockLevels::from_ingredients(ingredients);
    let stock = stock_metrics(ingredients, &thresholds.stock());
    let product = product_metrics(products, &levels);

    let metrics = DashboardMetrics {
        total_ingredients: ingredients.len(),
        critical_ingredients: stock.critical,
        low_ingredients: stock.low,
        total_products: product.total,
        preparable_products: product.preparable,
        non_preparable_products: product.non_preparable,
        products_without_recipe: product.without_recipe,
        average_product_cost: product.average_cost,
        active_categories: categories.len(),
        stock,
    };

    DashboardReport {
        metrics,
        stock_alerts: stock_alerts(ingredients, thresholds),
        product_alerts: product_alerts(products, &levels, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryInfo, RecipeLine};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ingredient(id: i64, name: &str, current: &str, max: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            sale_price: Decimal::ZERO,
            unit_id: 1,
            unit_name: "Kilogramos".to_string(),
            category_id: 1,
            category_name: "Secos".to_string(),
            in_subcategory: false,
            parent_category_name: None,
            purchase_price: dec("10"),
            current_stock: dec(current),
            max_stock: dec(max),
            is_raw_material: true,
            images: vec![],
            used_by_products: 0,
        }
    }

    fn product(id: i64, name: &str, sale: &str, lines: &[(i64, &str, &str)]) -> Product {
        Product {
            id,
            name: name.to_string(),
            sale_price: dec(sale),
            unit_id: 1,
            unit_name: "Unidades".to_string(),
            category: CategoryInfo {
                id: 1,
                name: "Pizzas".to_string(),
                is_subcategory: false,
                parent_name: None,
            },
            description: None,
            prep_minutes: 20,
            instructions: None,
            lines: lines
                .iter()
                .map(|(ingredient_id, qty, price)| RecipeLine {
                    detail_id: None,
                    ingredient_id: *ingredient_id,
                    ingredient_name: format!("ingredient-{}", ingredient_id),
                    unit_name: "Kilogramos".to_string(),
                    unit_price: dec(price),
                    quantity: dec(qty),
                })
                .collect(),
            images: vec![],
            units_sold: 0,
        }
    }

    #[test]
    fn test_stock_alerts_critical_before_low() {
        let ingredients = vec![
            ingredient(1, "Tomate", "35", "100"),
            ingredient(2, "Harina", "5", "100"),
            ingredient(3, "Queso", "90", "100"),
            ingredient(4, "Aceite", "10", "100"),
            ingredient(5, "Sal", "20", "100"),
        ];
        let alerts = stock_alerts(&ingredients, &AlertThresholds::default());
        let ids: Vec<_> = alerts.iter().map(|a| a.ingredient_id).collect();
        assert_eq!(ids, vec![2, 4, 1, 5]);
        assert_eq!(alerts[0].priority, Priority::High);
        assert_eq!(alerts[2].kind, StockAlertKind::Low);
        assert_eq!(alerts[0].message, "Harina has critical stock (5/100)");
    }

    #[test]
    fn test_no_recipe_product_not_reported_as_unpreparable() {
        let ingredients = vec![ingredient(1, "Harina", "0", "100")];
        let products = vec![
            product(1, "Pizza", "100", &[(1, "1", "10")]),
            product(2, "Agua", "50", &[]),
        ];
        let report = aggregate(&ingredients, &products, &[], &AlertThresholds::default());

        let kinds: Vec<_> = report
            .product_alerts
            .iter()
            .map(|a| (a.product_id, a.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(1, ProductAlertKind::NotPreparable), (2, ProductAlertKind::NoRecipe)]
        );
        assert_eq!(report.metrics.non_preparable_products, 1);
        assert_eq!(report.metrics.products_without_recipe, 1);
    }

    #[test]
    fn test_thin_margin_alert() {
        let ingredients = vec![ingredient(1, "Carne", "100", "100")];
        let products = vec![
            product(1, "Lomo", "110", &[(1, "1", "100")]),
            product(2, "Milanesa", "300", &[(1, "1", "100")]),
        ];
        let report = aggregate(&ingredients, &products, &[], &AlertThresholds::default());
        assert_eq!(report.product_alerts.len(), 1);
        assert_eq!(report.product_alerts[0].kind, ProductAlertKind::ThinMargin);
        assert_eq!(report.product_alerts[0].priority, Priority::Low);
        assert_eq!(report.product_alerts[0].message, "Lomo has a thin margin (10%)");
    }

    #[test]
    fn test_tiny_cost_does_not_break_aggregation() {
        let ingredients = vec![ingredient(1, "Sal", "100", "100")];
        let products = vec![product(
            1,
            "Caviar",
            "1000000000",
            &[(1, "0.0000000001", "0.0000000001")],
        )];
        let report = aggregate(&ingredients, &products, &[], &AlertThresholds::default());
        assert!(report.product_alerts.is_empty());
        assert_eq!(report.metrics.preparable_products, 1);
    }

    #[test]
    fn test_metrics_and_summary() {
        let ingredients = vec![
            ingredient(1, "Harina", "50", "100"),
            ingredient(2, "Queso", "5", "100"),
            ingredient(3, "Tomate", "30", "100"),
            ingredient(4, "Aceite", "120", "100"),
        ];
        let products = vec![
            product(1, "Pizza", "1000", &[(1, "10", "10"), (2, "1", "20")]),
            product(2, "Fugazza", "1000", &[(1, "60", "10")]),
            product(3, "Gaseosa", "500", &[]),
        ];
        let categories = vec![Category {
            id: 1,
            name: "Pizzas".to_string(),
            is_subcategory: false,
            parent: None,
            children: vec![],
            article_count: None,
        }];
        let report = aggregate(&ingredients, &products, &categories, &AlertThresholds::default());
        let m = &report.metrics;
        assert_eq!(m.total_ingredients, 4);
        assert_eq!(m.critical_ingredients, 1);
        assert_eq!(m.low_ingredients, 1);
        assert_eq!(m.stock.high, 1);
        assert_eq!(m.stock.overstocked, 1);
        assert_eq!(m.stock.total(), 4);
        assert_eq!(m.total_products, 3);
        assert_eq!(m.preparable_products, 1);
        assert_eq!(m.non_preparable_products, 1);
        assert_eq!(m.average_product_cost, dec("360"));
        assert_eq!(m.active_categories, 1);

        let summary = report.summary();
        assert_eq!(summary.stock, 2);
        assert_eq!(summary.products, 2);
        assert_eq!(summary.total, 4);
        // critical stock + not preparable
        assert_eq!(summary.critical, 2);
    }

    #[test]
    fn test_empty_collections() {
        let report = aggregate(&[], &[], &[], &AlertThresholds::default());
        assert!(!report.has_alerts());
        assert_eq!(report.metrics.average_product_cost, Decimal::ZERO);
        assert_eq!(report.summary(), AlertSummary::default());
    }
}
