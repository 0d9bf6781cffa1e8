//! Order lifecycle
//!
//! `pending` → `in-process` → `completed`, with `cancelled` reachable from
//! anywhere. Every state except `cancelled` holds the order's quantities out
//! of stock, so only transitions across that boundary move stock:
//!
//! | from \ to       | reserving   | cancelled |
//! |-----------------|-------------|-----------|
//! | reserving       | -           | restore   |
//! | cancelled       | re-reserve  | -         |

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Order, OrderCreate, OrderCreated, OrderItem, OrderStatus, OrderUpdate, Product,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::OrderRef;
use super::error::{LedgerError, LedgerResult};
use super::money::{line_subtotal, order_total};
use super::numbering::{self, DEGRADED_WARNING};
use crate::catalog::{CatalogError, apply_stock_delta};
use crate::db::repository::{RepoError, order as order_repo, product as product_repo};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_payload};

/// Total quantity per product, in first-appearance order
fn aggregate_demand(lines: impl IntoIterator<Item = (i64, i64)>) -> Vec<(i64, i64)> {
    let mut demand: Vec<(i64, i64)> = Vec::new();
    for (product_id, quantity) in lines {
        match demand.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, total)) => *total = total.saturating_add(quantity),
            None => demand.push((product_id, quantity)),
        }
    }
    demand
}

fn order_demand(order: &Order) -> Vec<(i64, i64)> {
    aggregate_demand(order.items.iter().map(|i| (i.product_id, i.quantity)))
}

fn missing_product(product_id: i64) -> LedgerError {
    LedgerError::Validation(
        AppError::validation(format!("Product {product_id} not found"))
            .with_detail("product_id", product_id),
    )
}

fn amount_overflow() -> AppError {
    AppError::validation("Order amount is too large")
}

fn insufficient(product: &Product, requested: i64) -> LedgerError {
    LedgerError::InsufficientStock {
        product_id: product.id,
        product: product.name.clone(),
        available: product.stock,
        requested,
    }
}

fn normalize_notes(notes: Option<String>) -> LedgerResult<Option<String>> {
    let notes = notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    validate_optional_text(&notes, "notes", MAX_NOTE_LEN).map_err(LedgerError::Validation)?;
    Ok(notes)
}

fn validate_create(mut data: OrderCreate) -> LedgerResult<OrderCreate> {
    data.customer = data.customer.trimmed();
    data.notes = normalize_notes(data.notes)?;
    if data.items.is_empty() {
        return Err(LedgerError::Validation(AppError::new(ErrorCode::OrderEmpty)));
    }
    validate_payload(&data.customer).map_err(|e| {
        LedgerError::Validation(AppError {
            code: ErrorCode::OrderCustomerIncomplete,
            ..e
        })
    })?;
    validate_payload(&data).map_err(LedgerError::Validation)?;
    Ok(data)
}

/// Place an order.
///
/// Validates the payload, checks every product (exists, active, enough stock
/// for the quantity summed over all lines), freezes current prices, assigns
/// the number, inserts the order as `pending` and takes the stock. Any
/// failure rolls the whole operation back.
pub async fn create_order(
    pool: &SqlitePool,
    data: OrderCreate,
    idempotency_key: Option<&str>,
) -> LedgerResult<OrderCreated> {
    let data = validate_create(data)?;
    let key = idempotency_key.map(str::trim).filter(|k| !k.is_empty());
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    // Counter increment is the first write: the transaction holds the write lock from here on
    let mut assigned = numbering::assign(&mut tx).await;

    if let Some(key) = key
        && let Some(existing) = order_repo::find_by_idempotency_key(&mut tx, key).await?
    {
        tracing::warn!(order_number = %existing.number, "Duplicate order submission rejected");
        return Err(LedgerError::DuplicateSubmission(existing.number));
    }

    let mut products: HashMap<i64, Product> = HashMap::with_capacity(data.items.len());
    let mut items = Vec::with_capacity(data.items.len());
    for line in &data.items {
        let product = match products.entry(line.product_id) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let product = product_repo::find_by_id(&mut tx, line.product_id)
                    .await?
                    .ok_or_else(|| missing_product(line.product_id))?;
                if !product.is_active {
                    return Err(LedgerError::ProductUnavailable {
                        product_id: product.id,
                        product: product.name,
                    });
                }
                e.insert(product)
            }
        };
        let subtotal = line_subtotal(product.price, line.quantity).ok_or_else(|| {
            LedgerError::Validation(amount_overflow().with_detail("product_id", product.id))
        })?;
        items.push(OrderItem {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: line.quantity,
            unit_price: product.price,
            subtotal,
        });
    }

    let demand = aggregate_demand(data.items.iter().map(|l| (l.product_id, l.quantity)));
    for &(product_id, requested) in &demand {
        if let Some(product) = products.get(&product_id)
            && product.stock < requested
        {
            return Err(insufficient(product, requested));
        }
    }

    let total = order_total(&items).ok_or_else(|| LedgerError::Validation(amount_overflow()))?;
    let mut order = Order {
        id: shared::util::snowflake_id(),
        number: assigned.number.clone(),
        customer: data.customer,
        items,
        total,
        status: OrderStatus::Pending,
        status_label: None,
        payment_method: data.payment_method,
        notes: data.notes,
        created_at: now,
        updated_at: now,
    };

    match order_repo::insert(&mut tx, &order, assigned.seq, key).await {
        Ok(()) => {}
        Err(RepoError::Duplicate(first)) => {
            tracing::warn!(order_number = %order.number, error = %first, "Order number already taken, retrying");
            assigned = numbering::reassign(&mut tx).await?;
            order.number = assigned.number.clone();
            match order_repo::insert(&mut tx, &order, assigned.seq, key).await {
                Ok(()) => {}
                Err(RepoError::Duplicate(second)) => {
                    return Err(LedgerError::Transient(format!(
                        "order number collision after retry: {second}"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(e) => return Err(e.into()),
    }

    for &(product_id, requested) in &demand {
        apply_stock_delta(&mut tx, product_id, -requested, now).await?;
    }

    tx.commit().await?;

    tracing::info!(
        order_number = %order.number,
        order_id = order.id,
        total = %order.total,
        lines = order.items.len(),
        degraded_number = assigned.degraded,
        "Order created"
    );

    Ok(OrderCreated {
        order,
        warning: assigned.degraded.then(|| DEGRADED_WARNING.to_string()),
    })
}

/// All orders, newest first
pub async fn list_orders(pool: &SqlitePool) -> LedgerResult<Vec<Order>> {
    let mut conn = pool.acquire().await?;
    Ok(order_repo::find_all(&mut conn).await?)
}

pub async fn get_order(pool: &SqlitePool, reference: &OrderRef) -> LedgerResult<Order> {
    let mut conn = pool.acquire().await?;
    let found = match reference {
        OrderRef::Id(id) => order_repo::find_by_id(&mut conn, *id).await?,
        OrderRef::Number(number) => order_repo::find_by_number(&mut conn, number).await?,
    };
    found.ok_or_else(|| LedgerError::OrderNotFound(reference.to_string()))
}

/// Take the write lock on an order (bumping `updated_at`) and load it
pub(crate) async fn lock_order(
    conn: &mut SqliteConnection,
    reference: &OrderRef,
    now: i64,
) -> LedgerResult<Order> {
    let id = match reference {
        OrderRef::Id(id) => order_repo::touch(conn, *id, now).await?.then_some(*id),
        OrderRef::Number(number) => order_repo::touch_by_number(conn, number, now).await?,
    };
    let not_found = || LedgerError::OrderNotFound(reference.to_string());
    let id = id.ok_or_else(not_found)?;
    order_repo::find_by_id(conn, id).await?.ok_or_else(not_found)
}

/// Put an order's quantities back in stock.
///
/// A product that no longer exists is skipped with a warning.
pub(crate) async fn restore_stock(
    conn: &mut SqliteConnection,
    order: &Order,
    now: i64,
) -> LedgerResult<()> {
    for (product_id, quantity) in order_demand(order) {
        match apply_stock_delta(conn, product_id, quantity, now).await {
            Ok(stock) => {
                tracing::debug!(order_number = %order.number, product_id, quantity, stock, "Stock restored")
            }
            Err(CatalogError::NotFound(_)) => {
                tracing::warn!(order_number = %order.number, product_id, quantity, "Product no longer exists, stock not restored")
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Take an order's quantities out of stock again. Every line is checked
/// before any adjustment; the first short product fails the whole call.
async fn reserve_stock(conn: &mut SqliteConnection, order: &Order, now: i64) -> LedgerResult<()> {
    let demand = order_demand(order);
    for &(product_id, requested) in &demand {
        let product = product_repo::find_by_id(conn, product_id)
            .await?
            .ok_or_else(|| missing_product(product_id))?;
        if product.stock < requested {
            return Err(insufficient(&product, requested));
        }
    }
    for &(product_id, requested) in &demand {
        apply_stock_delta(conn, product_id, -requested, now).await?;
    }
    Ok(())
}

/// Apply an admin update: status (canonical or legacy synonym), notes,
/// payment method. Stock moves only when the status crosses the
/// reserving / cancelled boundary.
pub async fn update_order(
    pool: &SqlitePool,
    reference: &OrderRef,
    update: OrderUpdate,
) -> LedgerResult<Order> {
    let target = match update.status.as_deref() {
        Some(raw) => Some(OrderStatus::parse_input(raw).ok_or_else(|| {
            LedgerError::Validation(
                AppError::validation(format!("Invalid order status: {raw}"))
                    .with_detail("status", raw),
            )
        })?),
        None => None,
    };
    let notes = match update.notes {
        Some(notes) => Some(normalize_notes(Some(notes))?),
        None => None,
    };

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let mut order = lock_order(&mut tx, reference, now).await?;
    let previous = order.status;

    if let Some((status, label)) = target {
        match (previous.reserves_stock(), status.reserves_stock()) {
            (true, false) => restore_stock(&mut tx, &order, now).await?,
            (false, true) => reserve_stock(&mut tx, &order, now).await?,
            _ => {}
        }
        order.status = status;
        order.status_label = label.map(str::to_string);
    }
    if let Some(notes) = notes {
        order.notes = notes;
    }
    if let Some(method) = update.payment_method {
        order.payment_method = method;
    }
    order.updated_at = now;
    order_repo::update_mutable(&mut tx, &order).await?;

    tx.commit().await?;

    tracing::info!(
        order_number = %order.number,
        from = %previous,
        to = %order.status,
        "Order updated"
    );
    Ok(order)
}

/// Change only the status of an order
pub async fn set_status(
    pool: &SqlitePool,
    reference: &OrderRef,
    status: OrderStatus,
) -> LedgerResult<Order> {
    update_order(
        pool,
        reference,
        OrderUpdate {
            status: Some(status.as_str().to_string()),
            ..Default::default()
        },
    )
    .await
}

/// Remove a locked order, restoring its stock unless it was cancelled
pub(crate) async fn remove_locked(
    conn: &mut SqliteConnection,
    order: &Order,
    now: i64,
) -> LedgerResult<()> {
    if order.status.reserves_stock() {
        restore_stock(conn, order, now).await?;
    }
    if !order_repo::delete(conn, order.id).await? {
        return Err(LedgerError::OrderNotFound(order.number.clone()));
    }
    Ok(())
}

/// Delete an order permanently. Returns the removed order.
pub async fn delete_order(pool: &SqlitePool, reference: &OrderRef) -> LedgerResult<Order> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let order = lock_order(&mut tx, reference, now).await?;
    remove_locked(&mut tx, &order, now).await?;
    tx.commit().await?;

    tracing::info!(order_number = %order.number, status = %order.status, "Order deleted");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::db::DbService;
    use rust_decimal::Decimal;
    use shared::models::{Customer, OrderLineInput, ProductCategory, ProductCreate, UnitOfMeasure};

    async fn product(pool: &SqlitePool, name: &str, price: i64, stock: i64) -> Product {
        priced_product(pool, name, Decimal::new(price, 0), stock).await
    }

    async fn priced_product(pool: &SqlitePool, name: &str, price: Decimal, stock: i64) -> Product {
        catalog::create_product(
            pool,
            ProductCreate {
                name: name.into(),
                description: String::new(),
                price,
                stock,
                category: ProductCategory::Honey,
                unit: UnitOfMeasure::Kg,
                image: None,
            },
        )
        .await
        .unwrap()
    }

    fn checkout(lines: &[(i64, i64)]) -> OrderCreate {
        OrderCreate {
            customer: Customer {
                name: " Ana ".into(),
                email: "ana@example.com".into(),
                phone: "3001234567".into(),
                address: "Calle 1".into(),
            },
            items: lines
                .iter()
                .map(|&(product_id, quantity)| OrderLineInput {
                    product_id,
                    quantity,
                })
                .collect(),
            payment_method: Default::default(),
            notes: None,
        }
    }

    async fn stock(pool: &SqlitePool, id: i64) -> i64 {
        catalog::get_product(pool, id).await.unwrap().stock
    }

    #[test]
    fn test_aggregate_demand_keeps_first_appearance() {
        let demand = aggregate_demand([(2, 1), (1, 3), (2, 4)]);
        assert_eq!(demand, vec![(2, 5), (1, 3)]);
    }

    #[tokio::test]
    async fn test_repeated_product_lines_are_checked_together() {
        let db = DbService::in_memory().await.unwrap();
        let p = product(&db.pool, "Honey", 10, 5).await;

        let err = create_order(&db.pool, checkout(&[(p.id, 3), (p.id, 3)]), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock { available: 5, requested: 6, .. }
        ));
        assert_eq!(stock(&db.pool, p.id).await, 5);

        let created = create_order(&db.pool, checkout(&[(p.id, 2), (p.id, 3)]), None)
            .await
            .unwrap();
        assert_eq!(created.order.items.len(), 2);
        assert_eq!(created.order.total, Decimal::new(50, 0));
        assert_eq!(created.order.customer.name, "Ana");
        assert_eq!(stock(&db.pool, p.id).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products() {
        let db = DbService::in_memory().await.unwrap();
        let p = product(&db.pool, "Wax", 10, 5).await;

        let err = create_order(&db.pool, checkout(&[(999, 1)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        catalog::soft_delete_product(&db.pool, p.id).await.unwrap();
        let err = create_order(&db.pool, checkout(&[(p.id, 1)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ProductUnavailable { .. }));
        assert_eq!(stock(&db.pool, p.id).await, 5);
    }

    #[tokio::test]
    async fn test_empty_order_and_zero_quantity_rejected() {
        let db = DbService::in_memory().await.unwrap();
        let p = product(&db.pool, "Pollen", 10, 5).await;

        let err = create_order(&db.pool, checkout(&[]), None).await.unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::OrderEmpty);

        let mut blank_customer = checkout(&[(p.id, 1)]);
        blank_customer.customer.phone = "   ".into();
        let err = create_order(&db.pool, blank_customer, None).await.unwrap_err();
        let err = AppError::from(err);
        assert_eq!(err.code, ErrorCode::OrderCustomerIncomplete);
        assert!(err.details.is_some_and(|d| d.contains_key("phone")));

        let err = create_order(&db.pool, checkout(&[(p.id, 0)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sub_cent_price_is_charged_exactly() {
        let db = DbService::in_memory().await.unwrap();
        let p = priced_product(&db.pool, "Royal jelly", Decimal::new(125, 3), 5).await;

        let order = create_order(&db.pool, checkout(&[(p.id, 1), (p.id, 2)]), None)
            .await
            .unwrap()
            .order;
        for item in &order.items {
            assert_eq!(item.unit_price, Decimal::new(125, 3));
            assert_eq!(item.subtotal, item.unit_price * Decimal::from(item.quantity));
        }
        assert_eq!(order.total, Decimal::new(375, 3));
    }

    #[tokio::test]
    async fn test_amount_overflow_is_a_validation_error() {
        let db = DbService::in_memory().await.unwrap();
        let huge = Decimal::new(7, 0) * Decimal::new(10_000_000_000_000_000, 0)
            * Decimal::new(1_000_000_000_000, 0);
        let p = priced_product(&db.pool, "Gold honey", huge, 5).await;
        let q = priced_product(&db.pool, "Silver honey", huge, 5).await;

        let err = create_order(&db.pool, checkout(&[(p.id, 2)]), None)
            .await
            .unwrap_err();
        let err = AppError::from(err);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.details.is_some_and(|d| d.contains_key("product_id")));

        let err = create_order(&db.pool, checkout(&[(p.id, 1), (q.id, 1)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(stock(&db.pool, p.id).await, 5);
        assert_eq!(stock(&db.pool, q.id).await, 5);
    }

    #[tokio::test]
    async fn test_large_quantity_and_free_form_email_accepted() {
        let db = DbService::in_memory().await.unwrap();
        let p = product(&db.pool, "Bulk wax", 1, 20_000).await;

        let mut data = checkout(&[(p.id, 15_000)]);
        data.customer.email = "ana at finca".into();
        let order = create_order(&db.pool, data, None).await.unwrap().order;
        assert_eq!(order.customer.email, "ana at finca");
        assert_eq!(order.total, Decimal::new(15_000, 0));
        assert_eq!(stock(&db.pool, p.id).await, 5_000);
    }

    #[tokio::test]
    async fn test_idempotency_key_replay_is_rejected() {
        let db = DbService::in_memory().await.unwrap();
        let p = product(&db.pool, "Propolis", 10, 5).await;

        let first = create_order(&db.pool, checkout(&[(p.id, 2)]), Some("checkout-1"))
            .await
            .unwrap();
        let err = create_order(&db.pool, checkout(&[(p.id, 2)]), Some("checkout-1"))
            .await
            .unwrap_err();
        match err {
            LedgerError::DuplicateSubmission(number) => assert_eq!(number, first.order.number),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock(&db.pool, p.id).await, 3);

        // The rejected replay did not consume a number
        let next = create_order(&db.pool, checkout(&[(p.id, 1)]), None)
            .await
            .unwrap();
        assert_eq!(next.order.number, "AP-0002");
    }

    #[tokio::test]
    async fn test_legacy_status_keeps_label() {
        let db = DbService::in_memory().await.unwrap();
        let p = product(&db.pool, "Jelly", 10, 5).await;
        let created = create_order(&db.pool, checkout(&[(p.id, 1)]), None)
            .await
            .unwrap();
        let reference = OrderRef::Id(created.order.id);

        let order = update_order(
            &db.pool,
            &reference,
            OrderUpdate {
                status: Some("Ready".into()),
                notes: Some("  ring twice ".into()),
                payment_method: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(order.status, OrderStatus::InProcess);
        assert_eq!(order.status_label.as_deref(), Some("ready"));
        assert_eq!(order.notes.as_deref(), Some("ring twice"));

        let order = set_status(&db.pool, &reference, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(order.status_label, None);
        assert_eq!(stock(&db.pool, p.id).await, 4);

        let err = update_order(
            &db.pool,
            &reference,
            OrderUpdate {
                status: Some("shipped".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_order_reference() {
        let db = DbService::in_memory().await.unwrap();
        let err = delete_order(&db.pool, &OrderRef::number("ap-0404"))
            .await
            .unwrap_err();
        match err {
            LedgerError::OrderNotFound(r) => assert_eq!(r, "AP-0404"),
            other => panic!("unexpected error: {other:?}"),
        }
        let err = get_order(&db.pool, &OrderRef::Id(7)).await.unwrap_err();
        assert!(matches!(err, LedgerError::OrderNotFound(_)));
    }
}
