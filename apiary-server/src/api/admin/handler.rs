//! Admin API Handlers

use axum::body::Bytes;
use axum::extract::State;
use http::HeaderMap;
use serde::Serialize;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{
    LoginRequest, LoginResponse, Order, Product, PurgeSummary, Statistics, User, VerifyRequest,
};

use crate::api::extract::{AppJson, AppPath};
use crate::auth::{CurrentUser, JwtService, service as auth_service};
use crate::catalog;
use crate::core::ServerState;
use crate::maintenance;
use crate::utils::{ok, ok_with_message};

/// POST /api/admin/login
pub async fn login(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let resp = auth_service::login(&state.pool, state.get_jwt_service(), payload).await?;
    Ok(ok_with_message("Login successful", resp))
}

/// POST /api/admin/verify - `{"token": "..."}` or `Authorization: Bearer ...`
pub async fn verify(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<ApiResponse<User>> {
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<VerifyRequest>(&body)
            .map_err(|e| AppError::invalid_request(format!("Invalid JSON body: {e}")))?
            .token
    };
    let from_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .map(str::to_string);

    let token = from_body
        .or(from_header)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::invalid_token("Token not provided"))?;

    let user = auth_service::verify(&state.pool, state.get_jwt_service(), token.trim()).await?;
    Ok(ok(user))
}

/// GET /api/admin/products - all products including inactive ones
pub async fn list_products(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    Ok(ok(catalog::list_all(&state.pool).await?))
}

/// POST /api/admin/orders/purge
pub async fn purge_orders(
    State(state): State<ServerState>,
    admin: CurrentUser,
) -> AppResult<ApiResponse<PurgeSummary>> {
    let summary = maintenance::purge_all_orders(&state.pool).await?;
    tracing::warn!(admin_id = admin.id, deleted = summary.deleted, "Orders purged by admin");
    Ok(ok_with_message(
        format!("{} orders deleted, numbering reset", summary.deleted),
        summary,
    ))
}

/// POST /api/admin/orders/reset-numbering
pub async fn reset_numbering(
    State(state): State<ServerState>,
    admin: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    let record = maintenance::reset_numbering(&state.pool).await?;
    tracing::warn!(admin_id = admin.id, epoch = record.epoch, "Order numbering reset by admin");
    Ok(ApiResponse::message("Order numbering reset, next order is AP-0001"))
}

/// GET /api/admin/orders/search/{code}
pub async fn search_order(
    State(state): State<ServerState>,
    AppPath(code): AppPath<String>,
) -> AppResult<ApiResponse<Order>> {
    Ok(ok(maintenance::find_order_by_code(&state.pool, &code).await?))
}

/// DELETE /api/admin/orders/by-code/{code}
pub async fn delete_order_by_code(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppPath(code): AppPath<String>,
) -> AppResult<ApiResponse<()>> {
    let order = maintenance::delete_order_by_code(&state.pool, &code).await?;
    tracing::info!(admin_id = admin.id, order_number = %order.number, "Order deleted by code");
    Ok(ApiResponse::message(format!("Order {} deleted", order.number)))
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<ApiResponse<Statistics>> {
    Ok(ok(maintenance::statistics(&state.pool).await?))
}

#[derive(Debug, Serialize)]
pub struct SeedSummary {
    /// Number of products inserted (0 when the catalog was not empty)
    products: usize,
}

/// POST /api/admin/seed
pub async fn seed(State(state): State<ServerState>) -> AppResult<ApiResponse<SeedSummary>> {
    let created = maintenance::seed_demo_catalog(&state.pool).await?;
    let message = if created.is_empty() {
        "Catalog already has products, nothing seeded".to_string()
    } else {
        format!("{} demo products created", created.len())
    };
    Ok(ok_with_message(
        message,
        SeedSummary {
            products: created.len(),
        },
    ))
}
