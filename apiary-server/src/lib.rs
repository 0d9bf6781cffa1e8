//! Apiary Server - storefront backend for an apiary products business
//!
//! # Overview
//!
//! - **Catalog** (`catalog`): products and the single guarded stock mutator
//! - **Orders** (`orders`): numbering, order lifecycle, stock reservation
//! - **Maintenance** (`maintenance`): purge, numbering reset, lookup by code, statistics
//! - **Auth** (`auth`): admin accounts, JWT + Argon2
//! - **HTTP API** (`api`): axum routes over all of the above
//!
//! # Layout
//!
//! ```text
//! apiary-server/src/
//! ├── core/          # config, state, server
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── catalog/       # product store
//! ├── orders/        # order ledger + numbering
//! ├── maintenance/   # bulk admin operations, demo seed
//! ├── auth/          # JWT, middleware, login
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logger, validation
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod maintenance;
pub mod orders;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::DbService;

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and install the logger (`LOG_LEVEL`, `LOG_DIR`)
pub fn setup_environment() {
    if let Err(e) = dotenv::dotenv() {
        // A missing .env is normal in production
        eprintln!("No .env loaded: {e}");
    }
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ___          _
   /   |  ____  (_)___ ________  __
  / /| | / __ \/ / __ `/ ___/ / / /
 / ___ |/ /_/ / / /_/ / /  / /_/ /
/_/  |_/ .___/_/\__,_/_/   \__, /
      /_/                 /____/
    "#
    );
}
