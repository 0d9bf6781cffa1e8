//! Data models
//!
//! Shared between the server and API clients (storefront UI, tests).
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod order;
pub mod product;
pub mod site_config;
pub mod stats;
pub mod user;

// Re-exports
pub use order::*;
pub use product::*;
pub use site_config::*;
pub use stats::*;
pub use user::*;
