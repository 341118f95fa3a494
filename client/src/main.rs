//! bsctl - El Buen Sabor back-office from the command line
//!
//! Reads configuration from `config/{environment}.toml` and `SABOR_*`
//! environment variables, signs in when credentials are configured and runs
//! one command against the REST API.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use buen_sabor_client::config::{Config, LogFormat};
use buen_sabor_client::views::{
    CategoriesView, DashboardView, IngredientsView, ProductsView, StockView,
};
use buen_sabor_client::{ApiClient, AuthSession, Notifier, Services, TracingNotifier};
use shared::filters::{sort_by_key, IngredientFilter, ProductFilter};
use shared::format::{format_currency, format_number, format_percentage, truncate_text};
use shared::models::{CategoryNode, Credentials, PurchaseRequest, StockState};
use shared::recipe::RecipeBuilder;
use shared::types::SortDirection;

#[derive(Parser)]
#[command(name = "bsctl", version, about = "El Buen Sabor back-office")]
struct Cli {
    /// Override the API base URL
    #[arg(long, global = true, env = "SABOR_API__BASE_URL")]
    base_url: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Metrics and alerts
    Dashboard,
    /// List ingredients
    Ingredients(IngredientsArgs),
    /// List products with cost and preparability
    Products(ProductsArgs),
    /// Show the category tree
    Categories,
    /// Ingredients with critical or low stock
    Stock,
    /// Register an ingredient purchase
    Purchase(PurchaseArgs),
    /// Cost, suggested price and preparability of a product's recipe
    RecipeCost(RecipeCostArgs),
}

#[derive(Args)]
struct IngredientsArgs {
    /// Name contains
    #[arg(long)]
    search: Option<String>,

    /// Stock state (critico, bajo, normal, alto)
    #[arg(long, value_parser = parse_stock_state)]
    state: Option<StockState>,

    #[arg(long)]
    category: Option<i64>,

    /// Only critical or low stock
    #[arg(long)]
    restock: bool,

    /// Sort by stock percentage, lowest first
    #[arg(long)]
    by_stock: bool,
}

#[derive(Args)]
struct ProductsArgs {
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    category: Option<i64>,

    /// Only products that can be prepared now
    #[arg(long, conflicts_with = "not_preparable")]
    preparable: bool,

    /// Only products that cannot be prepared now
    #[arg(long)]
    not_preparable: bool,
}

#[derive(Args)]
struct PurchaseArgs {
    /// Ingredient id
    #[arg(long)]
    ingredient: i64,

    #[arg(long)]
    quantity: Decimal,

    /// Unit purchase price
    #[arg(long)]
    price: Decimal,

    /// Store the price as the ingredient's new purchase price
    #[arg(long)]
    update_price: bool,
}

#[derive(Args)]
struct RecipeCostArgs {
    /// Product id
    product: i64,

    /// Cost multiplier; defaults to the configured one
    #[arg(long)]
    multiplier: Option<Decimal>,

    /// Markup in percent, converted to a multiplier
    #[arg(long, conflicts_with = "multiplier")]
    markup: Option<Decimal>,

    /// Units to check stock for
    #[arg(long, default_value_t = 1)]
    batch: u32,
}

fn parse_stock_state(value: &str) -> Result<StockState, String> {
    StockState::from_code(value).ok_or_else(|| format!("unknown stock state: {}", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load().context("loading configuration")?;
    if let Some(base_url) = cli.base_url.clone() {
        config.api.base_url = base_url;
    }

    init_tracing(config.logging.format);
    tracing::debug!("Environment: {}", config.environment);

    let services = connect(&config).await?;
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    match cli.command {
        Command::Dashboard => dashboard(&config, &services, notifier, cli.format).await,
        Command::Ingredients(args) => {
            ingredients(&config, &services, notifier, args, cli.format).await
        }
        Command::Products(args) => products(&config, &services, notifier, args, cli.format).await,
        Command::Categories => categories(&services, notifier, cli.format).await,
        Command::Stock => stock(&services, notifier, cli.format).await,
        Command::Purchase(args) => purchase(&services, notifier, args).await,
        Command::RecipeCost(args) => {
            recipe_cost(&config, &services, notifier, args, cli.format).await
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "buen_sabor_client=info,bsctl=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Build the services, signing in with the configured credentials
async fn connect(config: &Config) -> anyhow::Result<Services> {
    let session = match &config.auth.token {
        Some(token) => AuthSession::with_token(token.clone()),
        None => AuthSession::new(),
    };
    let api = ApiClient::new(&config.api, session.clone())?;
    let services = Services::new(api);

    if !session.is_authenticated() {
        if let (Some(email), Some(password)) = (&config.auth.email, &config.auth.password) {
            let credentials = Credentials {
                email: email.clone(),
                password: password.clone(),
            };
            services
                .auth
                .login(&credentials)
                .await
                .context("signing in")?;
        }
    }

    Ok(services)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn dashboard(
    config: &Config,
    services: &Services,
    notifier: Arc<dyn Notifier>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut view = DashboardView::new(services, notifier)
        .with_thresholds(config.dashboard.thresholds())
        .with_timing(config.dashboard.auto_refresh(), config.dashboard.stale_after());
    if !view.reload().await {
        bail!("could not load the dashboard");
    }

    let report = view.report();
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "report": report,
            "summary": view.summary(),
            "lastUpdate": view.last_update(),
        }));
    }

    let m = &report.metrics;
    println!(
        "Ingredients: {} ({} critical, {} low)",
        m.total_ingredients, m.critical_ingredients, m.low_ingredients
    );
    println!(
        "Products:    {} ({} preparable, {} not preparable, {} without recipe)",
        m.total_products,
        m.preparable_products,
        m.non_preparable_products,
        m.products_without_recipe
    );
    println!("Average product cost: {}", format_currency(m.average_product_cost));
    println!("Main categories: {}", m.active_categories);

    let summary = view.summary();
    println!();
    println!("Alerts: {} ({} high priority)", summary.total, summary.critical);
    for alert in &report.stock_alerts {
        println!("  [{}] {}", alert.priority, alert.message);
    }
    for alert in &report.product_alerts {
        println!("  [{}] {}", alert.priority, alert.message);
    }
    Ok(())
}

async fn ingredients(
    config: &Config,
    services: &Services,
    notifier: Arc<dyn Notifier>,
    args: IngredientsArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut view = IngredientsView::new(services, notifier)
        .with_thresholds(config.dashboard.thresholds().stock());
    if !view.reload().await {
        bail!("could not load ingredients");
    }

    view.set_filter(IngredientFilter {
        search: args.search,
        category_id: args.category,
        stock_state: args.state,
        needs_restock: args.restock,
        ..IngredientFilter::default()
    });

    let mut rows = view.filtered();
    if args.by_stock {
        sort_by_key(&mut rows, |i| i.stock_percentage(), SortDirection::Asc);
    }

    if format == OutputFormat::Json {
        return print_json(&rows);
    }

    let thresholds = config.dashboard.thresholds().stock();
    for ingredient in &rows {
        println!(
            "{:>5}  {:<30} {:>10} / {:<10} {:>5}  {:<8} {}",
            ingredient.id,
            truncate_text(&ingredient.name, 30),
            format_number(ingredient.current_stock),
            format_number(ingredient.max_stock),
            format_percentage(ingredient.stock_percentage()),
            ingredient.stock_state_with(&thresholds),
            format_currency(ingredient.purchase_price),
        );
    }
    let metrics = view.stock_metrics();
    println!(
        "\n{} shown of {} ({} critical, {} low)",
        rows.len(),
        view.ingredients().len(),
        metrics.critical,
        metrics.low
    );
    Ok(())
}

async fn products(
    config: &Config,
    services: &Services,
    notifier: Arc<dyn Notifier>,
    args: ProductsArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut view = ProductsView::new(services, notifier)
        .with_default_multiplier(config.dashboard.default_multiplier());
    if !view.reload().await {
        bail!("could not load products");
    }

    let preparable = match (args.preparable, args.not_preparable) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    view.set_filter(ProductFilter {
        search: args.search,
        category_id: args.category,
        preparable,
        ..ProductFilter::default()
    });

    let rows = view.filtered();
    if format == OutputFormat::Json {
        return print_json(&rows);
    }

    for product in &rows {
        let margin = product
            .margin()
            .map(|m| format_percentage(m * Decimal::ONE_HUNDRED))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {:<30} cost {:>14}  price {:>14}  margin {:>6}  can make {}",
            product.id,
            truncate_text(&product.name, 30),
            format_currency(product.cost_total()),
            format_currency(product.sale_price),
            margin,
            view.max_preparable(product.id).unwrap_or(0),
        );
    }
    let metrics = view.metrics();
    println!(
        "\n{} shown of {} ({} preparable, {} without recipe)",
        rows.len(),
        metrics.total,
        metrics.preparable,
        metrics.without_recipe
    );
    Ok(())
}

async fn categories(
    services: &Services,
    notifier: Arc<dyn Notifier>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut view = CategoriesView::new(services, notifier);
    if !view.reload().await {
        bail!("could not load categories");
    }

    let tree = view.tree();
    if format == OutputFormat::Json {
        return print_json(&tree);
    }

    fn print_node(node: &CategoryNode) {
        let indent = "  ".repeat(node.level as usize);
        println!("{}{} ({})", indent, node.category.name, node.category.id);
        node.children.iter().for_each(print_node);
    }
    tree.iter().for_each(print_node);
    Ok(())
}

async fn stock(
    services: &Services,
    notifier: Arc<dyn Notifier>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut view = StockView::new(services, notifier);
    if !view.reload().await {
        bail!("could not load stock");
    }

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "critical": view.critical(),
            "low": view.low(),
        }));
    }

    println!("Critical: {}  Low: {}", view.total_critical(), view.total_low());
    for ingredient in view.needing_restock() {
        println!(
            "  {:<30} {:>10} / {:<10} {}",
            truncate_text(&ingredient.name, 30),
            format_number(ingredient.current_stock),
            format_number(ingredient.max_stock),
            format_percentage(ingredient.stock_percentage()),
        );
    }
    Ok(())
}

async fn purchase(
    services: &Services,
    notifier: Arc<dyn Notifier>,
    args: PurchaseArgs,
) -> anyhow::Result<()> {
    let mut view = StockView::new(services, notifier);
    let request = PurchaseRequest {
        ingredient_id: args.ingredient,
        purchase_price: args.price,
        quantity: args.quantity,
    };
    if !view.register_purchase(&request, args.update_price).await {
        bail!("purchase was not registered");
    }
    Ok(())
}

async fn recipe_cost(
    config: &Config,
    services: &Services,
    notifier: Arc<dyn Notifier>,
    args: RecipeCostArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut view = ProductsView::new(services, notifier)
        .with_default_multiplier(config.dashboard.default_multiplier());
    if !view.reload().await {
        bail!("could not load products");
    }
    let Some(product) = view.find(args.product) else {
        bail!("product {} not found", args.product);
    };

    let multiplier = match (args.multiplier, args.markup) {
        (Some(m), _) => m,
        (_, Some(markup)) => shared::recipe::markup_to_multiplier(markup),
        _ => view.default_multiplier(),
    };
    let recipe = RecipeBuilder::from_product(product);
    let stock = view.stock_levels();
    let check = recipe.check_stock(&stock, args.batch);
    let suggested = recipe.rounded_suggested_price(multiplier);
    let max_preparable = recipe.max_preparable(&stock);

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "productId": product.id,
            "name": product.name,
            "totalCost": recipe.total_cost(),
            "multiplier": multiplier,
            "suggestedPrice": suggested,
            "salePrice": product.sale_price,
            "maxPreparable": max_preparable,
            "batch": args.batch,
            "sufficient": check.sufficient,
            "missing": check.missing,
        }));
    }

    println!("{}", product.name);
    for line in recipe.lines() {
        println!(
            "  {:<30} {:>10} {:<10} {:>14}",
            truncate_text(&line.ingredient_name, 30),
            format_number(line.quantity),
            line.unit_name,
            format_currency(line.subtotal()),
        );
    }
    println!("Total cost:      {}", format_currency(recipe.total_cost()));
    match suggested {
        Some(price) => println!(
            "Suggested price: {} (x{})",
            format_currency(price),
            multiplier.normalize()
        ),
        None => println!("Suggested price: -"),
    }
    println!("Sale price:      {}", format_currency(product.sale_price));
    println!("Can make now:    {}", max_preparable);
    if check.sufficient {
        println!("Stock is enough for {} unit(s)", args.batch);
    } else {
        println!("Missing stock for {} unit(s):", args.batch);
        for line in &check.missing {
            println!("  {}", line.ingredient_name);
        }
    }
    Ok(())
}
