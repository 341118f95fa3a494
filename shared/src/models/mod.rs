//! Domain models for the Buen Sabor back-office

mod category;
mod ingredient;
mod product;
mod unit;
mod user;

pub use category::*;
pub use ingredient::*;
pub use product::*;
pub use unit::*;
pub use user::*;
