//! Order API Handlers

use axum::extract::State;
use http::HeaderMap;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{Order, OrderCreate, OrderCreated, OrderUpdate};

use crate::api::extract::{AppJson, AppPath};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::maintenance;
use crate::orders::{self, OrderRef};
use crate::utils::{ok, ok_with_message};

/// Client supplied replay key for checkout
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Longest accepted idempotency key
const MAX_IDEMPOTENCY_KEY_LEN: usize = 200;

fn idempotency_key(headers: &HeaderMap) -> AppResult<Option<String>> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };
    let key = value
        .to_str()
        .map_err(|_| AppError::invalid_request("Idempotency-Key must be visible ASCII"))?
        .trim();
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::invalid_request("Idempotency-Key is too long"));
    }
    Ok(Some(key.to_string()).filter(|k| !k.is_empty()))
}

fn parse_ref(raw: &str) -> OrderRef {
    let Ok(reference) = raw.parse::<OrderRef>();
    reference
}

/// GET /api/orders - newest first
pub async fn list(
    State(state): State<ServerState>,
    _admin: CurrentUser,
) -> AppResult<ApiResponse<Vec<Order>>> {
    Ok(ok(orders::list_orders(&state.pool).await?))
}

/// POST /api/orders - checkout
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<OrderCreate>,
) -> AppResult<ApiResponse<OrderCreated>> {
    let key = idempotency_key(&headers)?;
    let created = orders::create_order(&state.pool, payload, key.as_deref()).await?;
    let message = format!("Order {} created", created.order.number);
    Ok(ok_with_message(message, created))
}

/// GET /api/orders/{reference}
pub async fn get_by_ref(
    State(state): State<ServerState>,
    _admin: CurrentUser,
    AppPath(reference): AppPath<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = orders::get_order(&state.pool, &parse_ref(&reference)).await?;
    Ok(ok(order))
}

/// PUT /api/orders/{reference} - status / notes / payment method
pub async fn update(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppPath(reference): AppPath<String>,
    AppJson(payload): AppJson<OrderUpdate>,
) -> AppResult<ApiResponse<Order>> {
    let order = orders::update_order(&state.pool, &parse_ref(&reference), payload).await?;
    tracing::info!(admin_id = admin.id, order_number = %order.number, status = %order.status, "Order updated by admin");
    Ok(ok_with_message("Order updated", order))
}

/// DELETE /api/orders/{reference}
pub async fn delete(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppPath(reference): AppPath<String>,
) -> AppResult<ApiResponse<()>> {
    let order = orders::delete_order(&state.pool, &parse_ref(&reference)).await?;
    tracing::info!(admin_id = admin.id, order_number = %order.number, "Order deleted by admin");
    Ok(ApiResponse::message(format!("Order {} deleted", order.number)))
}

/// GET /api/orders/lookup/{code} - customer order tracking
pub async fn lookup(
    State(state): State<ServerState>,
    AppPath(code): AppPath<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = maintenance::find_order_by_code(&state.pool, &code).await?;
    Ok(ok(order))
}
