//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | GET | admin |
//! | /api/orders | POST | public (optional `Idempotency-Key` header) |
//! | /api/orders/{reference} | GET / PUT / DELETE | admin; id or `AP-NNNN` code |
//! | /api/orders/lookup/{code} | GET | public, suggests similar codes on a miss |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{reference}",
            get(handler::get_by_ref)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/lookup/{code}", get(handler::lookup))
}
