//! Admin API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/admin/login | POST | public |
//! | /api/admin/verify | POST | public (token in body or bearer header) |
//! | /api/admin/products | GET | admin, includes inactive |
//! | /api/admin/orders/purge | POST | admin |
//! | /api/admin/orders/reset-numbering | POST | admin |
//! | /api/admin/orders/search/{code} | GET | admin |
//! | /api/admin/orders/by-code/{code} | DELETE | admin |
//! | /api/admin/stats | GET | admin |
//! | /api/admin/seed | POST | admin |
//! | /api/admin/site-config | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::api::site_config;
use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/admin", public_routes().merge(protected_routes(state)))
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login))
        .route("/verify", post(handler::verify))
}

fn protected_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/products", get(handler::list_products))
        .route("/orders/purge", post(handler::purge_orders))
        .route("/orders/reset-numbering", post(handler::reset_numbering))
        .route("/orders/search/{code}", get(handler::search_order))
        .route("/orders/by-code/{code}", delete(handler::delete_order_by_code))
        .route("/stats", get(handler::stats))
        .route("/seed", post(handler::seed))
        .route("/site-config", put(site_config::handler::update))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}
