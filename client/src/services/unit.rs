use shared::models::{Unit, UnitRequest};

use crate::api::ApiClient;
use crate::error::ClientResult;

const BASE_PATH: &str = "/unidades-medida";

/// Units of measure endpoints
#[derive(Clone)]
pub struct UnitService {
    api: ApiClient,
}

impl UnitService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_all(&self) -> ClientResult<Vec<Unit>> {
        self.api.get(BASE_PATH).await
    }

    pub async fn get_by_id(&self, id: i64) -> ClientResult<Unit> {
        self.api.get(&format!("{}/{}", BASE_PATH, id)).await
    }

    pub async fn create(&self, request: &UnitRequest) -> ClientResult<Unit> {
        self.api.post(BASE_PATH, request).await
    }

    pub async fn update(&self, id: i64, request: &UnitRequest) -> ClientResult<Unit> {
        self.api.put(&format!("{}/{}", BASE_PATH, id), request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&format!("{}/{}", BASE_PATH, id)).await
    }
}
