//! Product Repository

use super::{RepoError, RepoResult, parse_column};
use rust_decimal::Decimal;
use shared::models::{Product, ProductCategory};
use sqlx::{SqliteConnection, SqlitePool};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, category, unit, image, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: String,
    stock: i64,
    category: String,
    unit: String,
    image: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepoError;

    fn try_from(row: ProductRow) -> RepoResult<Self> {
        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: parse_column::<Decimal>("product.price", &row.price)?,
            stock: row.stock,
            category: parse_column("product.category", &row.category)?,
            unit: parse_column("product.unit", &row.unit)?,
            image: row.image,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> RepoResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    row.map(Product::try_from).transpose()
}

/// Active products, optionally filtered by category, sorted by name
pub async fn find_active(
    pool: &SqlitePool,
    category: Option<ProductCategory>,
) -> RepoResult<Vec<Product>> {
    let rows = match category {
        Some(cat) => {
            let sql = format!(
                "SELECT {PRODUCT_COLUMNS} FROM product WHERE is_active = 1 AND category = ? ORDER BY name COLLATE NOCASE, id"
            );
            sqlx::query_as::<_, ProductRow>(&sql)
                .bind(cat.as_str())
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {PRODUCT_COLUMNS} FROM product WHERE is_active = 1 ORDER BY name COLLATE NOCASE, id"
            );
            sqlx::query_as::<_, ProductRow>(&sql).fetch_all(pool).await?
        }
    };
    into_products(rows)
}

/// Every product including inactive ones (admin view)
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY name COLLATE NOCASE, id");
    let rows = sqlx::query_as::<_, ProductRow>(&sql).fetch_all(pool).await?;
    into_products(rows)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO product (id, name, description, price, stock, category, unit, image, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price.to_string())
    .bind(product.stock)
    .bind(product.category.as_str())
    .bind(product.unit.as_str())
    .bind(&product.image)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Bump `updated_at`; false when the product does not exist
pub async fn touch(conn: &mut SqliteConnection, id: i64, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE product SET updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

/// Persist every attribute except `stock` (only [`adjust_stock`] moves stock)
pub async fn update_details(conn: &mut SqliteConnection, product: &Product) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE product SET name = ?1, description = ?2, price = ?3, category = ?4, unit = ?5, image = ?6, is_active = ?7, updated_at = ?8 WHERE id = ?9",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price.to_string())
    .bind(product.category.as_str())
    .bind(product.unit.as_str())
    .bind(&product.image)
    .bind(product.is_active)
    .bind(product.updated_at)
    .bind(product.id)
    .execute(conn)
    .await?
    .rows_affected();
    if rows == 0 {
        return Err(RepoError::NotFound(format!("product {}", product.id)));
    }
    Ok(())
}

/// Outcome of a guarded stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjust {
    /// Applied, new stock level
    Applied(i64),
    /// Rejected, stock untouched (current level reported)
    Insufficient { available: i64 },
    NotFound,
}

/// Atomically apply `delta` to a product's stock.
///
/// Single conditional update guarded by `stock + delta >= 0`; a rejected
/// adjustment leaves the row untouched.
pub async fn adjust_stock(
    conn: &mut SqliteConnection,
    id: i64,
    delta: i64,
    now: i64,
) -> RepoResult<StockAdjust> {
    let applied: Option<i64> = sqlx::query_scalar(
        "UPDATE product SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 AND stock + ?1 >= 0 RETURNING stock",
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(stock) = applied {
        return Ok(StockAdjust::Applied(stock));
    }

    let current: Option<i64> = sqlx::query_scalar("SELECT stock FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(match current {
        Some(available) => StockAdjust::Insufficient { available },
        None => StockAdjust::NotFound,
    })
}
