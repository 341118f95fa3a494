//! Shared types and logic for the Buen Sabor back-office
//!
//! Everything in this crate is pure: models and DTOs, formatters, validators,
//! the recipe calculator, the dashboard aggregator and the filter layer. It is
//! used by the REST client and, through WASM, by the browser dashboard.

pub mod dashboard;
pub mod filters;
pub mod format;
pub mod models;
pub mod recipe;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
