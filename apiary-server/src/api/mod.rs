//! HTTP API
//!
//! Every response uses the `ApiResponse` envelope (`success`, `code`,
//! `message`, `error`, `data`, `details`).
//!
//! | Prefix | Module | Auth |
//! |--------|--------|------|
//! | /health | [`health`] | public |
//! | /api/products | [`products`] | read public, write admin |
//! | /api/orders | [`orders`] | create + lookup public, rest admin |
//! | /api/site-config | [`site_config`] | public |
//! | /api/admin | [`admin`] | admin (login / verify public) |

pub mod admin;
pub mod extract;
pub mod health;
pub mod orders;
pub mod products;
pub mod site_config;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// All routes, no middleware, no state
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(site_config::router())
        .merge(admin::router(state))
}

/// Fully configured application, used by the server and by router tests
pub fn build_app(state: ServerState) -> Router {
    build_router(&state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
