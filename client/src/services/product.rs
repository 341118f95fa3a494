//! Manufactured product (articulo manufacturado) endpoints

use rust_decimal::Decimal;
use shared::models::{Product, ProductRequest};

use crate::api::ApiClient;
use crate::error::ClientResult;

const BASE_PATH: &str = "/articulos-manufacturados";

#[derive(Clone)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn path(id: i64, suffix: &str) -> String {
        format!("{}/{}{}", BASE_PATH, id, suffix)
    }

    // CRUD

    pub async fn get_all(&self) -> ClientResult<Vec<Product>> {
        self.api.get(BASE_PATH).await
    }

    pub async fn get_by_id(&self, id: i64) -> ClientResult<Product> {
        self.api.get(&Self::path(id, "")).await
    }

    pub async fn create(&self, request: &ProductRequest) -> ClientResult<Product> {
        self.api.post(BASE_PATH, request).await
    }

    pub async fn update(&self, id: i64, request: &ProductRequest) -> ClientResult<Product> {
        self.api.put(&Self::path(id, ""), request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&Self::path(id, "")).await
    }

    // Queries

    pub async fn get_by_category(&self, category_id: i64) -> ClientResult<Vec<Product>> {
        self.api
            .get(&format!("{}/categoria/{}", BASE_PATH, category_id))
            .await
    }

    pub async fn get_by_max_time(&self, minutes: u32) -> ClientResult<Vec<Product>> {
        self.api
            .get(&format!("{}/tiempo-maximo/{}", BASE_PATH, minutes))
            .await
    }

    pub async fn get_by_ingredient(&self, ingredient_id: i64) -> ClientResult<Vec<Product>> {
        self.api
            .get(&format!("{}/ingrediente/{}", BASE_PATH, ingredient_id))
            .await
    }

    pub async fn get_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> ClientResult<Vec<Product>> {
        self.api
            .get_with(
                &format!("{}/precio-rango", BASE_PATH),
                &[("precioMin", min.to_string()), ("precioMax", max.to_string())],
            )
            .await
    }

    pub async fn get_by_min_ingredients(&self, count: usize) -> ClientResult<Vec<Product>> {
        self.api
            .get(&format!("{}/minimo-ingredientes/{}", BASE_PATH, count))
            .await
    }

    pub async fn search(&self, name: &str) -> ClientResult<Vec<Product>> {
        self.api
            .get_with(&format!("{}/buscar", BASE_PATH), &[("denominacion", name)])
            .await
    }

    // Preparability and costing as computed by the backend

    pub async fn get_preparable(&self) -> ClientResult<Vec<Product>> {
        self.api.get(&format!("{}/preparables", BASE_PATH)).await
    }

    pub async fn get_not_preparable(&self) -> ClientResult<Vec<Product>> {
        self.api.get(&format!("{}/no-preparables", BASE_PATH)).await
    }

    pub async fn max_preparable(&self, id: i64) -> ClientResult<u64> {
        self.api.get(&Self::path(id, "/maximo-preparable")).await
    }

    pub async fn can_prepare(&self, id: i64, quantity: u32) -> ClientResult<bool> {
        self.api
            .get_with(&Self::path(id, "/puede-prepararse"), &[("cantidad", quantity)])
            .await
    }

    pub async fn total_cost(&self, id: i64) -> ClientResult<Decimal> {
        self.api.get(&Self::path(id, "/costo-total")).await
    }

    pub async fn margin(&self, id: i64) -> ClientResult<Decimal> {
        self.api.get(&Self::path(id, "/margen-ganancia")).await
    }

    pub async fn suggested_price(&self, id: i64, multiplier: Decimal) -> ClientResult<Decimal> {
        self.api
            .get_with(
                &Self::path(id, "/precio-sugerido"),
                &[("margen", multiplier.to_string())],
            )
            .await
    }

    // Recipe lines

    pub async fn add_ingredient(
        &self,
        id: i64,
        ingredient_id: i64,
        quantity: Decimal,
    ) -> ClientResult<Product> {
        self.api
            .post_with(
                &Self::path(id, "/ingredientes"),
                &[
                    ("idInsumo", ingredient_id.to_string()),
                    ("cantidad", quantity.to_string()),
                ],
            )
            .await
    }

    pub async fn update_ingredient(
        &self,
        id: i64,
        detail_id: i64,
        quantity: Decimal,
    ) -> ClientResult<Product> {
        self.api
            .put_with(
                &Self::path(id, &format!("/ingredientes/{}", detail_id)),
                &[("nuevaCantidad", quantity.to_string())],
            )
            .await
    }

    pub async fn remove_ingredient(&self, id: i64, detail_id: i64) -> ClientResult<Product> {
        self.api
            .delete(&Self::path(id, &format!("/ingredientes/{}", detail_id)))
            .await
    }

    // Production

    /// Products that can be produced `quantity` times
    pub async fn simulate_production(&self, quantity: u32) -> ClientResult<Vec<Product>> {
        self.api
            .get_with(
                &format!("{}/simulacion-produccion", BASE_PATH),
                &[("cantidadAProducir", quantity)],
            )
            .await
    }

    pub async fn verify_production_stock(&self, id: i64, quantity: u32) -> ClientResult<bool> {
        self.api
            .get_with(
                &Self::path(id, "/verificar-stock-produccion"),
                &[("cantidadAProducir", quantity)],
            )
            .await
    }

    // Checks

    pub async fn exists_by_name(&self, name: &str) -> ClientResult<bool> {
        self.api
            .get_with(&format!("{}/exists", BASE_PATH), &[("denominacion", name)])
            .await
    }

    pub async fn has_ingredients(&self, id: i64) -> ClientResult<bool> {
        self.api.get(&Self::path(id, "/tiene-ingredientes")).await
    }

    pub async fn is_used_in_orders(&self, id: i64) -> ClientResult<bool> {
        self.api.get(&Self::path(id, "/usado-en-pedidos")).await
    }
}
