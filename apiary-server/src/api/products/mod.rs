//! Product API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/products?category= | GET | public (active only) |
//! | /api/products | POST | admin |
//! | /api/products/{id} | GET | public |
//! | /api/products/{id} | PUT / DELETE | admin (DELETE is a soft delete) |
//! | /api/products/{id}/stock | POST | admin, relative adjustment |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/stock", post(handler::adjust_stock))
}
