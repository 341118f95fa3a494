//! One service per backend resource

mod auth;
mod category;
mod ingredient;
mod product;
mod unit;

pub use auth::AuthService;
pub use category::CategoryService;
pub use ingredient::IngredientService;
pub use product::ProductService;
pub use unit::UnitService;

use crate::api::ApiClient;

/// All services sharing one API client
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub categories: CategoryService,
    pub ingredients: IngredientService,
    pub products: ProductService,
    pub units: UnitService,
}

impl Services {
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth: AuthService::new(api.clone()),
            categories: CategoryService::new(api.clone()),
            ingredients: IngredientService::new(api.clone()),
            products: ProductService::new(api.clone()),
            units: UnitService::new(api),
        }
    }
}
