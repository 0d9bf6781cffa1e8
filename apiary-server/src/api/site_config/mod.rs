//! Site configuration API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/site-config | GET | public, defaults created on first read |
//! | /api/admin/site-config | PUT | admin (mounted by the admin router) |

pub(crate) mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/site-config", get(handler::get))
}
