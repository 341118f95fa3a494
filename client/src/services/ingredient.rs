//! Ingredient (articulo insumo) endpoints

use rust_decimal::Decimal;
use shared::models::{Ingredient, IngredientRequest, PurchaseRequest, StockAdjustment};

use crate::api::ApiClient;
use crate::error::ClientResult;

const BASE_PATH: &str = "/articulos-insumo";

#[derive(Clone)]
pub struct IngredientService {
    api: ApiClient,
}

impl IngredientService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    // CRUD

    pub async fn get_all(&self) -> ClientResult<Vec<Ingredient>> {
        self.api.get(BASE_PATH).await
    }

    pub async fn get_by_id(&self, id: i64) -> ClientResult<Ingredient> {
        self.api.get(&format!("{}/{}", BASE_PATH, id)).await
    }

    pub async fn create(&self, request: &IngredientRequest) -> ClientResult<Ingredient> {
        self.api.post(BASE_PATH, request).await
    }

    pub async fn update(&self, id: i64, request: &IngredientRequest) -> ClientResult<Ingredient> {
        self.api.put(&format!("{}/{}", BASE_PATH, id), request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&format!("{}/{}", BASE_PATH, id)).await
    }

    // Queries

    pub async fn get_by_category(&self, category_id: i64) -> ClientResult<Vec<Ingredient>> {
        self.api
            .get(&format!("{}/categoria/{}", BASE_PATH, category_id))
            .await
    }

    pub async fn get_by_unit(&self, unit_id: i64) -> ClientResult<Vec<Ingredient>> {
        self.api
            .get(&format!("{}/unidad-medida/{}", BASE_PATH, unit_id))
            .await
    }

    /// Raw materials used in recipes
    pub async fn get_raw_materials(&self) -> ClientResult<Vec<Ingredient>> {
        self.api.get(&format!("{}/ingredientes", BASE_PATH)).await
    }

    /// Articles sold as-is
    pub async fn get_resale_articles(&self) -> ClientResult<Vec<Ingredient>> {
        self.api
            .get(&format!("{}/productos-no-manufacturados", BASE_PATH))
            .await
    }

    pub async fn search(&self, name: &str) -> ClientResult<Vec<Ingredient>> {
        self.api
            .get_with(&format!("{}/buscar", BASE_PATH), &[("denominacion", name)])
            .await
    }

    // Stock

    pub async fn get_critical_stock(&self) -> ClientResult<Vec<Ingredient>> {
        self.api.get(&format!("{}/stock/critico", BASE_PATH)).await
    }

    pub async fn get_low_stock(&self) -> ClientResult<Vec<Ingredient>> {
        self.api.get(&format!("{}/stock/bajo", BASE_PATH)).await
    }

    /// Ingredients with less than `quantity` in stock
    pub async fn get_insufficient_stock(&self, quantity: Decimal) -> ClientResult<Vec<Ingredient>> {
        self.api
            .get_with(
                &format!("{}/stock/insuficiente", BASE_PATH),
                &[("cantidad", quantity.to_string())],
            )
            .await
    }

    pub async fn set_stock(&self, id: i64, new_stock: Decimal) -> ClientResult<Ingredient> {
        self.api
            .put_with(
                &format!("{}/{}/stock", BASE_PATH, id),
                &[("nuevoStock", new_stock.to_string())],
            )
            .await
    }

    pub async fn increment_stock(&self, id: i64, quantity: Decimal) -> ClientResult<Ingredient> {
        self.api
            .put_with(
                &format!("{}/{}/stock/incrementar", BASE_PATH, id),
                &[("cantidad", quantity.to_string())],
            )
            .await
    }

    pub async fn decrement_stock(&self, id: i64, quantity: Decimal) -> ClientResult<Ingredient> {
        self.api
            .put_with(
                &format!("{}/{}/stock/decrementar", BASE_PATH, id),
                &[("cantidad", quantity.to_string())],
            )
            .await
    }

    /// Dispatch a typed stock edit to the matching endpoint
    pub async fn adjust_stock(
        &self,
        id: i64,
        adjustment: StockAdjustment,
    ) -> ClientResult<Ingredient> {
        match adjustment {
            StockAdjustment::Set(value) => self.set_stock(id, value).await,
            StockAdjustment::Increment(value) => self.increment_stock(id, value).await,
            StockAdjustment::Decrement(value) => self.decrement_stock(id, value).await,
        }
    }

    pub async fn register_purchase(&self, purchase: &PurchaseRequest) -> ClientResult<Ingredient> {
        self.api
            .post(&format!("{}/registrar-compra", BASE_PATH), purchase)
            .await
    }

    // Checks

    pub async fn exists_by_name(&self, name: &str) -> ClientResult<bool> {
        self.api
            .get_with(&format!("{}/exists", BASE_PATH), &[("denominacion", name)])
            .await
    }

    pub async fn has_stock_available(&self, id: i64, quantity: Decimal) -> ClientResult<bool> {
        self.api
            .get_with(
                &format!("{}/{}/stock-available", BASE_PATH, id),
                &[("cantidad", quantity.to_string())],
            )
            .await
    }

    pub async fn is_used_in_products(&self, id: i64) -> ClientResult<bool> {
        self.api
            .get(&format!("{}/{}/used-in-products", BASE_PATH, id))
            .await
    }
}
