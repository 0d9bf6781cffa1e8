//! Catalog Store
//!
//! Product records and the single stock mutator. Every stock change, from
//! the order ledger or from an admin edit, goes through [`apply_stock_delta`],
//! a guarded conditional update that never lets stock go negative.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DEFAULT_PRODUCT_IMAGE, Product, ProductCategory, ProductCreate, ProductUpdate,
};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;

use crate::db::repository::product::{self as product_repo, StockAdjust};
use crate::db::repository::RepoError;
use crate::utils::validation::{MAX_URL_LEN, validate_optional_text, validate_payload};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(i64),

    #[error("Insufficient stock for {name}. Available: {available}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    #[error(transparent)]
    Invalid(AppError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id)
            }
            CatalogError::InsufficientStock {
                product_id,
                ref name,
                available,
                requested,
            } => AppError::with_message(ErrorCode::ProductOutOfStock, err.to_string())
                .with_detail("product_id", product_id)
                .with_detail("product", name.clone())
                .with_detail("available", available)
                .with_detail("requested", requested),
            CatalogError::Invalid(app) => app,
            CatalogError::Repo(repo) => repo.into(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Load a product (active or not)
pub async fn get_product(pool: &SqlitePool, id: i64) -> CatalogResult<Product> {
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    product_repo::find_by_id(&mut conn, id)
        .await?
        .ok_or(CatalogError::NotFound(id))
}

/// Active products, optionally by category, sorted by name
pub async fn list_active(
    pool: &SqlitePool,
    category: Option<ProductCategory>,
) -> CatalogResult<Vec<Product>> {
    Ok(product_repo::find_active(pool, category).await?)
}

/// All products including inactive ones
pub async fn list_all(pool: &SqlitePool) -> CatalogResult<Vec<Product>> {
    Ok(product_repo::find_all(pool).await?)
}

fn check_price(price: Decimal) -> CatalogResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::Invalid(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "Price cannot be negative",
        )));
    }
    Ok(())
}

fn check_name(name: &str) -> CatalogResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Invalid(AppError::validation(
            "Product name is required",
        )));
    }
    Ok(trimmed.to_string())
}

pub async fn create_product(pool: &SqlitePool, data: ProductCreate) -> CatalogResult<Product> {
    validate_payload(&data).map_err(CatalogError::Invalid)?;
    validate_optional_text(&data.image, "image", MAX_URL_LEN).map_err(CatalogError::Invalid)?;
    check_price(data.price)?;
    let name = check_name(&data.name)?;

    let now = shared::util::now_millis();
    let product = Product {
        id: shared::util::snowflake_id(),
        name,
        description: data.description.trim().to_string(),
        price: data.price,
        stock: data.stock,
        category: data.category,
        unit: data.unit,
        image: data
            .image
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string()),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    product_repo::insert(&mut conn, &product).await?;
    tracing::info!(product_id = product.id, name = %product.name, "Product created");
    Ok(product)
}

/// Apply an admin edit. A requested absolute stock level is converted into a
/// delta and routed through [`apply_stock_delta`].
pub async fn update_product(
    pool: &SqlitePool,
    id: i64,
    data: ProductUpdate,
) -> CatalogResult<Product> {
    validate_payload(&data).map_err(CatalogError::Invalid)?;
    validate_optional_text(&data.image, "image", MAX_URL_LEN).map_err(CatalogError::Invalid)?;
    if let Some(price) = data.price {
        check_price(price)?;
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    // Write first so the transaction holds the write lock before reading
    if !product_repo::touch(&mut tx, id, now).await? {
        return Err(CatalogError::NotFound(id));
    }
    let mut product = product_repo::find_by_id(&mut tx, id)
        .await?
        .ok_or(CatalogError::NotFound(id))?;

    if let Some(name) = data.name {
        product.name = check_name(&name)?;
    }
    if let Some(description) = data.description {
        product.description = description.trim().to_string();
    }
    if let Some(price) = data.price {
        product.price = price;
    }
    if let Some(category) = data.category {
        product.category = category;
    }
    if let Some(unit) = data.unit {
        product.unit = unit;
    }
    if let Some(image) = data.image {
        product.image = image;
    }
    if let Some(active) = data.is_active {
        product.is_active = active;
    }
    product.updated_at = now;
    product_repo::update_details(&mut tx, &product).await?;

    if let Some(target) = data.stock {
        let delta = target - product.stock;
        if delta != 0 {
            product.stock = apply_stock_delta(&mut tx, id, delta, now).await?;
        }
    }

    tx.commit().await.map_err(RepoError::from)?;
    tracing::info!(product_id = id, "Product updated");
    Ok(product)
}

/// Soft delete: the product disappears from the storefront, orders keep their snapshot
pub async fn soft_delete_product(pool: &SqlitePool, id: i64) -> CatalogResult<Product> {
    update_product(
        pool,
        id,
        ProductUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
}

/// Admin relative stock adjustment
pub async fn adjust_stock(pool: &SqlitePool, id: i64, delta: i64) -> CatalogResult<Product> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await.map_err(RepoError::from)?;
    apply_stock_delta(&mut tx, id, delta, now).await?;
    let product = product_repo::find_by_id(&mut tx, id)
        .await?
        .ok_or(CatalogError::NotFound(id))?;
    tx.commit().await.map_err(RepoError::from)?;
    tracing::info!(product_id = id, delta, stock = product.stock, "Stock adjusted");
    Ok(product)
}

/// Atomic check-and-apply on the caller's connection / transaction.
///
/// Returns the new stock level. On rejection nothing is written.
pub async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    id: i64,
    delta: i64,
    now: i64,
) -> CatalogResult<i64> {
    match product_repo::adjust_stock(conn, id, delta, now).await? {
        StockAdjust::Applied(stock) => Ok(stock),
        StockAdjust::NotFound => Err(CatalogError::NotFound(id)),
        StockAdjust::Insufficient { available } => {
            let name = product_repo::find_by_id(conn, id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| format!("product {id}"));
            Err(CatalogError::InsufficientStock {
                product_id: id,
                name,
                available,
                requested: delta.saturating_neg(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::UnitOfMeasure;

    fn payload(name: &str, stock: i64) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            description: "".into(),
            price: Decimal::new(5, 0),
            stock,
            category: ProductCategory::Pollen,
            unit: UnitOfMeasure::G,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_and_validation() {
        let db = DbService::in_memory().await.unwrap();
        let p = create_product(&db.pool, payload("  Bee pollen ", 20))
            .await
            .unwrap();
        assert_eq!(p.name, "Bee pollen");
        assert_eq!(p.image, DEFAULT_PRODUCT_IMAGE);
        assert!(p.is_active);

        let err = create_product(&db.pool, payload("   ", 1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));

        let mut negative = payload("Wax", 1);
        negative.price = Decimal::new(-1, 0);
        let err: AppError = create_product(&db.pool, negative).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
    }

    #[tokio::test]
    async fn test_update_routes_stock_through_delta() {
        let db = DbService::in_memory().await.unwrap();
        let p = create_product(&db.pool, payload("Propolis", 15)).await.unwrap();

        let updated = update_product(
            &db.pool,
            p.id,
            ProductUpdate {
                stock: Some(4),
                price: Some(Decimal::new(45000, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.stock, 4);
        assert_eq!(updated.price, Decimal::new(45000, 0));

        let reloaded = get_product(&db.pool, p.id).await.unwrap();
        assert_eq!(reloaded.stock, 4);
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_negative_result() {
        let db = DbService::in_memory().await.unwrap();
        let p = create_product(&db.pool, payload("Royal jelly", 3)).await.unwrap();

        let err = adjust_stock(&db.pool, p.id, -4).await.unwrap_err();
        match err {
            CatalogError::InsufficientStock {
                name,
                available,
                requested,
                ..
            } => {
                assert_eq!(name, "Royal jelly");
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(get_product(&db.pool, p.id).await.unwrap().stock, 3);

        let err = adjust_stock(&db.pool, p.id, i64::MIN).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InsufficientStock { requested: i64::MAX, available: 3, .. }
        ));
        assert_eq!(get_product(&db.pool, p.id).await.unwrap().stock, 3);

        let after = adjust_stock(&db.pool, p.id, 7).await.unwrap();
        assert_eq!(after.stock, 10);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_storefront() {
        let db = DbService::in_memory().await.unwrap();
        let p = create_product(&db.pool, payload("Beeswax", 25)).await.unwrap();
        soft_delete_product(&db.pool, p.id).await.unwrap();

        assert!(list_active(&db.pool, None).await.unwrap().is_empty());
        let all = list_all(&db.pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);

        let err = soft_delete_product(&db.pool, 12345).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(12345)));
    }
}
