//! El Buen Sabor back-office client
//!
//! Typed access to the Buen Sabor REST API: one service per resource, an
//! authentication session shared by every request, and page-level views
//! that cache collections and derive stock and recipe metrics locally.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod services;
pub mod session;
pub mod views;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, ClientError, ClientResult};
pub use notify::{MemoryNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use services::Services;
pub use session::AuthSession;
