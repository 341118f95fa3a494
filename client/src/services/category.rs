//! Category endpoints

use shared::models::{Category, CategoryRequest};

use crate::api::ApiClient;
use crate::error::ClientResult;

const BASE_PATH: &str = "/categorias";

#[derive(Clone)]
pub struct CategoryService {
    api: ApiClient,
}

impl CategoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_all(&self) -> ClientResult<Vec<Category>> {
        self.api.get(BASE_PATH).await
    }

    pub async fn get_by_id(&self, id: i64) -> ClientResult<Category> {
        self.api.get(&format!("{}/{}", BASE_PATH, id)).await
    }

    pub async fn create(&self, request: &CategoryRequest) -> ClientResult<Category> {
        self.api.post(BASE_PATH, request).await
    }

    pub async fn update(&self, id: i64, request: &CategoryRequest) -> ClientResult<Category> {
        self.api.put(&format!("{}/{}", BASE_PATH, id), request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&format!("{}/{}", BASE_PATH, id)).await
    }

    /// Top-level categories
    pub async fn get_main(&self) -> ClientResult<Vec<Category>> {
        self.api.get(&format!("{}/principales", BASE_PATH)).await
    }

    pub async fn get_subcategories(&self, parent_id: i64) -> ClientResult<Vec<Category>> {
        self.api
            .get(&format!("{}/{}/subcategorias", BASE_PATH, parent_id))
            .await
    }

    pub async fn search(&self, name: &str) -> ClientResult<Vec<Category>> {
        self.api
            .get_with(&format!("{}/buscar", BASE_PATH), &[("denominacion", name)])
            .await
    }

    pub async fn exists_by_name(&self, name: &str) -> ClientResult<bool> {
        self.api
            .get_with(&format!("{}/exists", BASE_PATH), &[("denominacion", name)])
            .await
    }

    pub async fn has_subcategories(&self, id: i64) -> ClientResult<bool> {
        self.api
            .get(&format!("{}/{}/has-subcategorias", BASE_PATH, id))
            .await
    }

    pub async fn has_articles(&self, id: i64) -> ClientResult<bool> {
        self.api
            .get(&format!("{}/{}/has-articulos", BASE_PATH, id))
            .await
    }
}
