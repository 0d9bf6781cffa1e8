use crate::catalog::CatalogError;
use crate::db::repository::RepoError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Order ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("{0}")]
    Validation(AppError),

    #[error("Insufficient stock for {product}. Available: {available}")]
    InsufficientStock {
        product_id: i64,
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("Product is not available: {product}")]
    ProductUnavailable { product_id: i64, product: String },

    #[error("Order already submitted as {0}")]
    DuplicateSubmission(String),

    #[error("Transient store error: {0}")]
    Transient(String),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<CatalogError> for LedgerError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InsufficientStock {
                product_id,
                name,
                available,
                requested,
            } => LedgerError::InsufficientStock {
                product_id,
                product: name,
                available,
                requested,
            },
            CatalogError::NotFound(id) => LedgerError::Validation(
                AppError::validation(format!("Product {id} not found"))
                    .with_detail("product_id", id),
            ),
            CatalogError::Invalid(app) => LedgerError::Validation(app),
            CatalogError::Repo(repo) => LedgerError::Repo(repo),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Repo(err.into())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::OrderNotFound(reference) => {
                AppError::with_message(ErrorCode::OrderNotFound, message)
                    .with_detail("order", reference)
            }
            LedgerError::Validation(app) => app,
            LedgerError::InsufficientStock {
                product_id,
                product,
                available,
                requested,
            } => AppError::with_message(ErrorCode::ProductOutOfStock, message)
                .with_detail("product_id", product_id)
                .with_detail("product", product)
                .with_detail("available", available)
                .with_detail("requested", requested),
            LedgerError::ProductUnavailable {
                product_id,
                product,
            } => AppError::with_message(ErrorCode::ProductUnavailable, message)
                .with_detail("product_id", product_id)
                .with_detail("product", product),
            LedgerError::DuplicateSubmission(number) => {
                AppError::with_message(ErrorCode::OrderDuplicateSubmission, message)
                    .with_detail("order_number", number)
            }
            LedgerError::Transient(reason) => {
                tracing::warn!(reason = %reason, "Transient store error");
                AppError::busy("The store is busy, please retry")
            }
            LedgerError::Repo(repo) => repo.into(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
