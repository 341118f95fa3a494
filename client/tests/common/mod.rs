//! In-process mock of the Buen Sabor REST API
//!
//! Serves a small in-memory data set on a random local port and records
//! every request as `"METHOD /path?query"` (without the `/api` prefix).

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::json;

use buen_sabor_client::{ApiClient, AuthSession, Services};
use shared::models::{
    Category, CategoryInfo, CategoryRef, CategoryRequest, Credentials, Ingredient,
    IngredientRequest, LoginResponse, Product, RecipeLine, Role, StockState, Unit, UserProfile,
};

pub const TOKEN: &str = "valid-token";
pub const PASSWORD: &str = "secret";

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn ingredient(id: i64, name: &str, current: &str, max: &str, price: &str) -> Ingredient {
    Ingredient {
        id,
        name: name.to_string(),
        sale_price: Decimal::ZERO,
        unit_id: 1,
        unit_name: "Gramos".to_string(),
        category_id: 1,
        category_name: "Insumos".to_string(),
        in_subcategory: false,
        parent_category_name: None,
        purchase_price: dec(price),
        current_stock: dec(current),
        max_stock: dec(max),
        is_raw_material: true,
        images: vec![],
        used_by_products: 0,
    }
}

/// `lines` are `(ingredient id, quantity, unit price)`
pub fn product(id: i64, name: &str, sale: &str, lines: &[(i64, &str, &str)]) -> Product {
    Product {
        id,
        name: name.to_string(),
        sale_price: dec(sale),
        unit_id: 1,
        unit_name: "Unidades".to_string(),
        category: CategoryInfo {
            id: 2,
            name: "Pizzas".to_string(),
            is_subcategory: false,
            parent_name: None,
        },
        description: None,
        prep_minutes: 20,
        instructions: None,
        lines: lines
            .iter()
            .enumerate()
            .map(|(n, (ingredient_id, quantity, price))| RecipeLine {
                detail_id: Some(n as i64 + 1),
                ingredient_id: *ingredient_id,
                ingredient_name: format!("ingredient-{}", ingredient_id),
                unit_name: "g".to_string(),
                unit_price: dec(price),
                quantity: dec(quantity),
            })
            .collect(),
        images: vec![],
        units_sold: 0,
    }
}

pub fn category(id: i64, name: &str, parent: Option<i64>) -> Category {
    Category {
        id,
        name: name.to_string(),
        is_subcategory: parent.is_some(),
        parent: parent.map(|pid| CategoryRef {
            id: pid,
            name: format!("category-{}", pid),
            is_subcategory: false,
        }),
        children: vec![],
        article_count: None,
    }
}

pub fn unit(id: i64, name: &str) -> Unit {
    Unit {
        id,
        name: name.to_string(),
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        id: 1,
        name: "Ana".to_string(),
        email: "ana@buensabor.com".to_string(),
        role: Role::Admin,
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Default)]
pub struct MockState {
    pub ingredients: Vec<Ingredient>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub units: Vec<Unit>,
    /// Products referenced by orders
    pub ordered_products: HashSet<i64>,
    /// Answer the product list with a 500
    pub fail_products: bool,
    pub hits: Vec<String>,
    next_id: i64,
}

impl MockState {
    /// Mozzarella is critical, flour is low, tomato is normal
    pub fn seeded() -> Self {
        Self {
            ingredients: vec![
                ingredient(1, "Harina", "30", "100", "2"),
                ingredient(2, "Mozzarella", "10", "100", "8"),
                ingredient(3, "Tomate", "60", "100", "3"),
            ],
            products: vec![
                product(10, "Pizza", "500", &[(1, "20", "2"), (2, "4", "8")]),
                product(11, "Empanada", "100", &[]),
            ],
            categories: vec![
                category(1, "Insumos", None),
                category(2, "Pizzas", None),
                category(3, "Especiales", Some(2)),
            ],
            units: vec![unit(1, "Gramos"), unit(2, "Unidades")],
            next_id: 100,
            ..Self::default()
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<MockState>>;

fn with<R>(state: &Shared, f: impl FnOnce(&mut MockState) -> R) -> R {
    let mut guard = state.lock().unwrap();
    f(&mut guard)
}

// ============================================================================
// Server
// ============================================================================

pub struct MockBackend {
    pub base_url: String,
    state: Shared,
}

impl MockBackend {
    pub async fn spawn(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn api(&self, session: AuthSession) -> ApiClient {
        ApiClient::with_base_url(self.base_url.clone(), session)
    }

    pub fn services(&self) -> Services {
        Services::new(self.api(AuthSession::with_token(TOKEN)))
    }

    pub fn hits(&self) -> Vec<String> {
        with(&self.state, |s| s.hits.clone())
    }

    pub fn count(&self, hit: &str) -> usize {
        self.hits().iter().filter(|h| h.as_str() == hit).count()
    }

    pub fn clear_hits(&self) {
        with(&self.state, |s| s.hits.clear());
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        with(&self.state, f)
    }
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/articulos-insumo", get(list_ingredients).post(create_ingredient))
        .route("/articulos-insumo/stock/critico", get(critical_stock))
        .route("/articulos-insumo/stock/bajo", get(low_stock))
        .route(
            "/articulos-insumo/:id",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
        .route("/articulos-insumo/:id/used-in-products", get(ingredient_in_use))
        .route("/articulos-insumo/:id/stock", put(set_stock))
        .route("/articulos-insumo/:id/stock/incrementar", put(increment_stock))
        .route("/unidades-medida", get(list_units))
        .route("/articulos-manufacturados", get(list_products))
        .route("/articulos-manufacturados/:id", delete(delete_product))
        .route(
            "/articulos-manufacturados/:id/usado-en-pedidos",
            get(product_in_orders),
        )
        .route("/categorias", get(list_categories).post(create_category))
        .route("/categorias/:id", delete(delete_category))
        .route("/categorias/principales", get(main_categories))
        .route("/categorias/exists", get(category_exists))
        .route("/categorias/:id/has-subcategorias", get(has_subcategories))
        .route("/categorias/:id/has-articulos", get(has_articles))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().trim_start_matches("/api").to_string())
        .unwrap_or_default();
    let hit = format!("{} {}", request.method(), target);
    with(&state, |s| s.hits.push(hit));
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn decimal_param(query: &HashMap<String, String>, name: &str) -> Option<Decimal> {
    query.get(name).and_then(|v| Decimal::from_str(v).ok())
}

// ============================================================================
// Ingredients and units
// ============================================================================

async fn list_ingredients(State(state): State<Shared>) -> Json<Vec<Ingredient>> {
    Json(with(&state, |s| s.ingredients.clone()))
}

async fn get_ingredient(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    match with(&state, |s| s.ingredients.iter().find(|i| i.id == id).cloned()) {
        Some(found) => Json(found).into_response(),
        None => error(StatusCode::NOT_FOUND, "Ingredient not found"),
    }
}

fn apply_request(target: &mut Ingredient, request: &IngredientRequest) {
    target.name = request.name.clone();
    target.sale_price = request.sale_price;
    target.unit_id = request.unit_id;
    target.category_id = request.category_id;
    target.purchase_price = request.purchase_price;
    target.current_stock = request.current_stock;
    target.max_stock = request.max_stock;
    target.is_raw_material = request.is_raw_material;
}

async fn create_ingredient(
    State(state): State<Shared>,
    Json(request): Json<IngredientRequest>,
) -> Response {
    let created = with(&state, |s| {
        let mut created = ingredient(s.next_id(), "", "0", "0", "0");
        apply_request(&mut created, &request);
        s.ingredients.push(created.clone());
        created
    });
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_ingredient(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(request): Json<IngredientRequest>,
) -> Response {
    let updated = with(&state, |s| {
        let target = s.ingredients.iter_mut().find(|i| i.id == id)?;
        apply_request(target, &request);
        Some(target.clone())
    });
    match updated {
        Some(updated) => Json(updated).into_response(),
        None => error(StatusCode::NOT_FOUND, "Ingredient not found"),
    }
}

async fn delete_ingredient(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    with(&state, |s| s.ingredients.retain(|i| i.id != id));
    StatusCode::NO_CONTENT
}

async fn ingredient_in_use(State(state): State<Shared>, Path(id): Path<i64>) -> Json<bool> {
    Json(with(&state, |s| s.products.iter().any(|p| p.uses_ingredient(id))))
}

fn change_stock(state: &Shared, id: i64, change: impl FnOnce(Decimal) -> Decimal) -> Response {
    let updated = with(state, |s| {
        let target = s.ingredients.iter_mut().find(|i| i.id == id)?;
        target.current_stock = change(target.current_stock);
        Some(target.clone())
    });
    match updated {
        Some(updated) => Json(updated).into_response(),
        None => error(StatusCode::NOT_FOUND, "Ingredient not found"),
    }
}

async fn set_stock(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    match decimal_param(&query, "nuevoStock") {
        Some(value) => change_stock(&state, id, |_| value),
        None => error(StatusCode::BAD_REQUEST, "nuevoStock is required"),
    }
}

async fn increment_stock(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    match decimal_param(&query, "cantidad") {
        Some(amount) => change_stock(&state, id, |current| current + amount),
        None => error(StatusCode::BAD_REQUEST, "cantidad is required"),
    }
}

fn by_state(state: &Shared, wanted: StockState) -> Vec<Ingredient> {
    with(state, |s| {
        s.ingredients
            .iter()
            .filter(|i| i.stock_state() == wanted)
            .cloned()
            .collect()
    })
}

async fn critical_stock(State(state): State<Shared>) -> Json<Vec<Ingredient>> {
    Json(by_state(&state, StockState::Critical))
}

async fn low_stock(State(state): State<Shared>) -> Json<Vec<Ingredient>> {
    Json(by_state(&state, StockState::Low))
}

async fn list_units(State(state): State<Shared>) -> Json<Vec<Unit>> {
    Json(with(&state, |s| s.units.clone()))
}

// ============================================================================
// Products
// ============================================================================

async fn list_products(State(state): State<Shared>) -> Response {
    let (fail, products) = with(&state, |s| (s.fail_products, s.products.clone()));
    if fail {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    Json(products).into_response()
}

async fn delete_product(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    with(&state, |s| s.products.retain(|p| p.id != id));
    StatusCode::NO_CONTENT
}

async fn product_in_orders(State(state): State<Shared>, Path(id): Path<i64>) -> Json<bool> {
    Json(with(&state, |s| s.ordered_products.contains(&id)))
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(state): State<Shared>) -> Json<Vec<Category>> {
    Json(with(&state, |s| s.categories.clone()))
}

async fn main_categories(State(state): State<Shared>) -> Json<Vec<Category>> {
    Json(with(&state, |s| {
        s.categories
            .iter()
            .filter(|c| c.is_top_level())
            .cloned()
            .collect()
    }))
}

async fn create_category(
    State(state): State<Shared>,
    Json(request): Json<CategoryRequest>,
) -> Response {
    let created = with(&state, |s| {
        let mut created = category(s.next_id(), &request.name, request.parent_id);
        created.is_subcategory = request.is_subcategory;
        s.categories.push(created.clone());
        created
    });
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn delete_category(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    with(&state, |s| s.categories.retain(|c| c.id != id));
    StatusCode::NO_CONTENT
}

async fn category_exists(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<bool> {
    let name = query.get("denominacion").cloned().unwrap_or_default();
    Json(with(&state, |s| {
        s.categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }))
}

async fn has_subcategories(State(state): State<Shared>, Path(id): Path<i64>) -> Json<bool> {
    Json(with(&state, |s| {
        s.categories.iter().any(|c| c.parent_id() == Some(id))
    }))
}

async fn has_articles(State(state): State<Shared>, Path(id): Path<i64>) -> Json<bool> {
    Json(with(&state, |s| {
        s.ingredients.iter().any(|i| i.category_id == id)
            || s.products.iter().any(|p| p.category.id == id)
    }))
}

// ============================================================================
// Auth
// ============================================================================

async fn login(Json(credentials): Json<Credentials>) -> Response {
    if credentials.password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    Json(LoginResponse {
        user: profile(),
        token: TOKEN.to_string(),
    })
    .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {}", TOKEN);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);

    if authorized {
        Json(profile()).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Token expired")
    }
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}
