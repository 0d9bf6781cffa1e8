//! Order Repository

use super::{RepoError, RepoResult, parse_column};
use rust_decimal::Decimal;
use shared::models::{Customer, Order, OrderDigest, OrderItem};
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_COLUMNS: &str = "id, number, customer_name, customer_email, customer_phone, customer_address, items, total, status, status_label, payment_method, notes, created_at, updated_at";

/// Newest first; ties broken by sequence
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, number_seq DESC, id DESC";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    number: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_address: String,
    items: String,
    total: String,
    status: String,
    status_label: Option<String>,
    payment_method: String,
    notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> RepoResult<Self> {
        let items: Vec<OrderItem> = serde_json::from_str(&row.items)?;
        Ok(Order {
            id: row.id,
            number: row.number,
            customer: Customer {
                name: row.customer_name,
                email: row.customer_email,
                phone: row.customer_phone,
                address: row.customer_address,
            },
            items,
            total: parse_column::<Decimal>("orders.total", &row.total)?,
            status: parse_column("orders.status", &row.status)?,
            status_label: row.status_label,
            payment_method: parse_column("orders.payment_method", &row.payment_method)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    row.map(Order::try_from).transpose()
}

/// Case-insensitive exact match on the order number
pub async fn find_by_number(
    conn: &mut SqliteConnection,
    number: &str,
) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE number = ? COLLATE NOCASE");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(number)
        .fetch_optional(conn)
        .await?;
    row.map(Order::try_from).transpose()
}

pub async fn find_by_idempotency_key(
    conn: &mut SqliteConnection,
    key: &str,
) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE idempotency_key = ?");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(key)
        .fetch_optional(conn)
        .await?;
    row.map(Order::try_from).transpose()
}

/// All orders, newest first
pub async fn find_all(conn: &mut SqliteConnection) -> RepoResult<Vec<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders {NEWEST_FIRST}");
    let rows = sqlx::query_as::<_, OrderRow>(&sql).fetch_all(conn).await?;
    into_orders(rows)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Number of the most recently created order
pub async fn latest_number(conn: &mut SqliteConnection) -> RepoResult<Option<String>> {
    let sql = format!("SELECT number FROM orders {NEWEST_FIRST} LIMIT 1");
    let number: Option<String> = sqlx::query_scalar(&sql).fetch_optional(conn).await?;
    Ok(number)
}

/// Highest sequence ever assigned among existing orders (0 when empty)
pub async fn max_seq(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(number_seq), 0) FROM orders")
        .fetch_one(conn)
        .await?;
    Ok(max)
}

/// (number, status, created_at) of every order, sorted by number
pub async fn digest(pool: &SqlitePool) -> RepoResult<Vec<OrderDigest>> {
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT number, status, created_at FROM orders ORDER BY number_seq, number",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|(number, status, created_at)| {
            Ok(OrderDigest {
                number,
                status: parse_column("orders.status", &status)?,
                created_at,
            })
        })
        .collect()
}

/// Order numbers whose numeric part (prefix `AP-` removed) contains `fragment`
pub async fn similar_numbers(
    pool: &SqlitePool,
    fragment: &str,
    limit: i64,
) -> RepoResult<Vec<String>> {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{escaped}%");
    let numbers: Vec<String> = sqlx::query_scalar(
        "SELECT number FROM orders WHERE REPLACE(UPPER(number), 'AP-', '') LIKE ?1 ESCAPE '\\' ORDER BY number_seq, number LIMIT ?2",
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(numbers)
}

/// Insert a new order. A duplicate number or idempotency key surfaces as
/// [`RepoError::Duplicate`].
pub async fn insert(
    conn: &mut SqliteConnection,
    order: &Order,
    number_seq: i64,
    idempotency_key: Option<&str>,
) -> RepoResult<()> {
    let items = serde_json::to_string(&order.items)?;
    sqlx::query(
        "INSERT INTO orders (id, number, number_seq, customer_name, customer_email, customer_phone, customer_address, items, total, status, status_label, payment_method, notes, idempotency_key, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(order.id)
    .bind(&order.number)
    .bind(number_seq)
    .bind(&order.customer.name)
    .bind(&order.customer.email)
    .bind(&order.customer.phone)
    .bind(&order.customer.address)
    .bind(items)
    .bind(order.total.to_string())
    .bind(order.status.as_str())
    .bind(&order.status_label)
    .bind(order.payment_method.as_str())
    .bind(&order.notes)
    .bind(idempotency_key)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Bump `updated_at`, returns false when the order does not exist.
///
/// Used as the first statement of a write transaction so the write lock is
/// taken before the order is read.
pub async fn touch(conn: &mut SqliteConnection, id: i64, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE orders SET updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

/// Same as [`touch`], addressing the order by (case-insensitive) number.
/// Returns the order id when it exists.
pub async fn touch_by_number(
    conn: &mut SqliteConnection,
    number: &str,
    now: i64,
) -> RepoResult<Option<i64>> {
    let id: Option<i64> = sqlx::query_scalar(
        "UPDATE orders SET updated_at = ?1 WHERE number = ?2 COLLATE NOCASE RETURNING id",
    )
    .bind(now)
    .bind(number)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

/// Persist the mutable fields (status, label, payment method, notes)
pub async fn update_mutable(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, status_label = ?2, payment_method = ?3, notes = ?4, updated_at = ?5 WHERE id = ?6",
    )
    .bind(order.status.as_str())
    .bind(&order.status_label)
    .bind(order.payment_method.as_str())
    .bind(&order.notes)
    .bind(order.updated_at)
    .bind(order.id)
    .execute(conn)
    .await?
    .rows_affected();
    if rows == 0 {
        return Err(RepoError::NotFound(format!("order {}", order.id)));
    }
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn delete_all(conn: &mut SqliteConnection) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM orders")
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{OrderStatus, PaymentMethod, format_order_number};

    fn order(id: i64, seq: i64, created_at: i64) -> Order {
        Order {
            id,
            number: format_order_number(seq),
            customer: Customer {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                phone: "300".into(),
                address: "Calle 1".into(),
            },
            items: vec![OrderItem {
                product_id: 1,
                product_name: "Pollen".into(),
                quantity: 2,
                unit_price: Decimal::new(5, 0),
                subtotal: Decimal::new(10, 0),
            }],
            total: Decimal::new(10, 0),
            status: OrderStatus::Pending,
            status_label: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_case_insensitive() {
        let db = DbService::in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        insert(&mut conn, &order(1, 7, 10), 7, Some("key-1"))
            .await
            .unwrap();

        let found = find_by_number(&mut conn, "ap-0007").await.unwrap().unwrap();
        assert_eq!(found.number, "AP-0007");
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.total, Decimal::new(10, 0));

        let by_key = find_by_idempotency_key(&mut conn, "key-1").await.unwrap();
        assert_eq!(by_key.map(|o| o.id), Some(1));
    }

    #[tokio::test]
    async fn test_duplicate_number_is_reported() {
        let db = DbService::in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        insert(&mut conn, &order(1, 1, 10), 1, None).await.unwrap();
        let err = insert(&mut conn, &order(2, 1, 11), 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_latest_and_max_seq() {
        let db = DbService::in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        assert_eq!(latest_number(&mut conn).await.unwrap(), None);
        assert_eq!(max_seq(&mut conn).await.unwrap(), 0);

        insert(&mut conn, &order(1, 9, 10), 9, None).await.unwrap();
        insert(&mut conn, &order(2, 3, 20), 3, None).await.unwrap();

        assert_eq!(
            latest_number(&mut conn).await.unwrap().as_deref(),
            Some("AP-0003")
        );
        assert_eq!(max_seq(&mut conn).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_similar_numbers_match_numeric_part() {
        let db = DbService::in_memory().await.unwrap();
        {
            let mut conn = db.pool.acquire().await.unwrap();
            for (id, seq) in [(1, 12), (2, 120), (3, 45)] {
                insert(&mut conn, &order(id, seq, id), seq, None)
                    .await
                    .unwrap();
            }
        }
        let similar = similar_numbers(&db.pool, "12", 10).await.unwrap();
        assert_eq!(similar, vec!["AP-0012".to_string(), "AP-0120".to_string()]);

        let none = similar_numbers(&db.pool, "%", 10).await.unwrap();
        assert!(none.is_empty());
    }
}
