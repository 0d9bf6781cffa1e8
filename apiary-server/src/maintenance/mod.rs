//! Maintenance Operations
//!
//! Bulk admin actions built on the ledger primitives: order lookup by code
//! (with suggestions), delete by code, purge, numbering reset, statistics
//! and the demo catalog seed.

pub mod seed;

pub use seed::seed_demo_catalog;

use shared::error::{AppError, ErrorCode};
use shared::models::{ORDER_NUMBER_PREFIX, Order, PurgeSummary, Statistics};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::repository::numbering::ControlRecord;
use crate::db::repository::{RepoError, order as order_repo, product as product_repo, user as user_repo};
use crate::orders::{self, LedgerError, OrderRef, ledger, numbering};

/// At most this many suggestions accompany a failed lookup
const MAX_SIMILAR: i64 = 10;

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("Order {code} not found")]
    OrderNotFound { code: String, similar: Vec<String> },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for MaintenanceError {
    fn from(err: sqlx::Error) -> Self {
        MaintenanceError::Repo(err.into())
    }
}

impl From<MaintenanceError> for AppError {
    fn from(err: MaintenanceError) -> Self {
        match err {
            MaintenanceError::OrderNotFound { ref code, ref similar } => {
                AppError::with_message(ErrorCode::OrderNotFound, err.to_string())
                    .with_detail("code", code.clone())
                    .with_detail("similar", similar.clone())
            }
            MaintenanceError::Ledger(e) => e.into(),
            MaintenanceError::Catalog(e) => e.into(),
            MaintenanceError::Repo(e) => e.into(),
        }
    }
}

pub type MaintenanceResult<T> = Result<T, MaintenanceError>;

/// Numeric part of a code, used for suggestions (`ap-12` -> `12`)
fn numeric_fragment(code: &str) -> &str {
    let prefix_len = ORDER_NUMBER_PREFIX.len();
    match code.get(..prefix_len) {
        Some(head) if head.eq_ignore_ascii_case(ORDER_NUMBER_PREFIX) => &code[prefix_len..],
        _ => code,
    }
}

/// Codes whose numeric part contains the numeric part of `code`
pub async fn similar_codes(pool: &SqlitePool, code: &str) -> MaintenanceResult<Vec<String>> {
    let fragment = numeric_fragment(code.trim());
    if fragment.is_empty() {
        return Ok(Vec::new());
    }
    Ok(order_repo::similar_numbers(pool, &fragment.to_uppercase(), MAX_SIMILAR).await?)
}

async fn not_found_with_suggestions(pool: &SqlitePool, code: &str) -> MaintenanceError {
    let similar = match similar_codes(pool, code).await {
        Ok(similar) => similar,
        Err(e) => {
            tracing::warn!(error = %e, "Similar order lookup failed");
            Vec::new()
        }
    };
    MaintenanceError::OrderNotFound {
        code: code.to_string(),
        similar,
    }
}

/// Find an order by its `AP-NNNN` code (case-insensitive).
///
/// A miss reports similar codes.
pub async fn find_order_by_code(pool: &SqlitePool, code: &str) -> MaintenanceResult<Order> {
    let reference = OrderRef::number(code);
    match ledger::get_order(pool, &reference).await {
        Ok(order) => Ok(order),
        Err(LedgerError::OrderNotFound(code)) => Err(not_found_with_suggestions(pool, &code).await),
        Err(e) => Err(e.into()),
    }
}

/// Delete an order by code, same effect as [`orders::delete_order`]
pub async fn delete_order_by_code(pool: &SqlitePool, code: &str) -> MaintenanceResult<Order> {
    let reference = OrderRef::number(code);
    match orders::delete_order(pool, &reference).await {
        Ok(order) => Ok(order),
        Err(LedgerError::OrderNotFound(code)) => Err(not_found_with_suggestions(pool, &code).await),
        Err(e) => Err(e.into()),
    }
}

/// Restore the stock of every non-cancelled order, delete all orders and
/// start a new numbering epoch, in one transaction.
pub async fn purge_all_orders(pool: &SqlitePool) -> MaintenanceResult<PurgeSummary> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    numbering::reset(&mut tx).await?;

    let all = order_repo::find_all(&mut tx).await?;
    let mut restored = 0usize;
    for order in all.iter().filter(|o| o.status.reserves_stock()) {
        ledger::restore_stock(&mut tx, order, now).await?;
        restored += 1;
    }
    let deleted = order_repo::delete_all(&mut tx).await?;

    tx.commit().await?;

    tracing::warn!(deleted, restored, "All orders purged, numbering reset");
    Ok(PurgeSummary { deleted })
}

/// Start a new numbering epoch; orders and stock are untouched
pub async fn reset_numbering(pool: &SqlitePool) -> MaintenanceResult<ControlRecord> {
    let mut tx = pool.begin().await?;
    let record = numbering::reset(&mut tx).await?;
    tx.commit().await?;
    Ok(record)
}

pub async fn statistics(pool: &SqlitePool) -> MaintenanceResult<Statistics> {
    let total_orders = order_repo::count(pool).await?;
    let total_products = product_repo::count(pool).await?;
    let total_users = user_repo::count(pool).await?;
    let last_order_number = {
        let mut conn = pool.acquire().await?;
        order_repo::latest_number(&mut conn).await?
    };
    let orders = order_repo::digest(pool).await?;

    Ok(Statistics {
        total_orders,
        total_products,
        total_users,
        last_order_number,
        orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_fragment() {
        assert_eq!(numeric_fragment("AP-0012"), "0012");
        assert_eq!(numeric_fragment("ap-7"), "7");
        assert_eq!(numeric_fragment("12"), "12");
        assert_eq!(numeric_fragment("AP-"), "");
        assert_eq!(numeric_fragment("A"), "A");
    }
}
