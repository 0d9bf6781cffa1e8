//! Product API Handlers

use axum::extract::State;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{Product, ProductCategory, ProductCreate, ProductUpdate, StockAdjustment};

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::auth::CurrentUser;
use crate::catalog;
use crate::core::ServerState;
use crate::utils::{ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
}

/// GET /api/products - active products, optionally by category
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<ProductCategory>().map_err(AppError::validation)?),
    };
    let products = catalog::list_active(&state.pool, category).await?;
    Ok(ok(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<Product>> {
    Ok(ok(catalog::get_product(&state.pool, id).await?))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppJson(payload): AppJson<ProductCreate>,
) -> AppResult<ApiResponse<Product>> {
    let product = catalog::create_product(&state.pool, payload).await?;
    tracing::info!(admin_id = admin.id, product_id = product.id, "Product created by admin");
    Ok(ok_with_message("Product created", product))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<ProductUpdate>,
) -> AppResult<ApiResponse<Product>> {
    let product = catalog::update_product(&state.pool, id, payload).await?;
    tracing::info!(admin_id = admin.id, product_id = id, "Product updated by admin");
    Ok(ok_with_message("Product updated", product))
}

/// DELETE /api/products/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<Product>> {
    let product = catalog::soft_delete_product(&state.pool, id).await?;
    tracing::info!(admin_id = admin.id, product_id = id, "Product deactivated by admin");
    Ok(ok_with_message("Product deactivated", product))
}

/// POST /api/products/{id}/stock - relative adjustment (`{"delta": -3}`)
pub async fn adjust_stock(
    State(state): State<ServerState>,
    admin: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<StockAdjustment>,
) -> AppResult<ApiResponse<Product>> {
    let product = catalog::adjust_stock(&state.pool, id, payload.delta).await?;
    tracing::info!(admin_id = admin.id, product_id = id, delta = payload.delta, "Stock adjusted by admin");
    Ok(ok(product))
}
