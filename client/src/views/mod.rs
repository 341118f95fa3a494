//! Collection views
//!
//! Each view caches one page worth of collections. Every successful mutation
//! reloads the cache, except the single-field stock update which patches the
//! cached row. Failures are turned into notifications here and surfaced to
//! the caller as `None` or `false`.

mod categories;
mod dashboard;
mod ingredients;
mod products;
mod stock;

pub use categories::CategoriesView;
pub use dashboard::DashboardView;
pub use ingredients::IngredientsView;
pub use products::ProductsView;
pub use stock::StockView;

use crate::error::ClientResult;
use crate::notify::Notifier;

/// Log and notify a failed call, keeping the value of a successful one
fn settle<T>(notifier: &dyn Notifier, context: &str, result: ClientResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(status = e.status(), "{}: {}", context, e);
            notifier.error(&format!("{}: {}", context, e));
            None
        }
    }
}
