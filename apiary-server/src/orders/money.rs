//! Money calculation using rust_decimal
//!
//! Prices are stored and computed as `Decimal`. Client-sent totals are never
//! trusted; every subtotal and total is recomputed here. Amounts keep the
//! scale of the catalog price, so `subtotal == unit_price × quantity` holds
//! exactly. `None` means the amount does not fit in a `Decimal`.

use rust_decimal::prelude::*;
use shared::models::OrderItem;

/// quantity × unit price
pub fn line_subtotal(unit_price: Decimal, quantity: i64) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(quantity))
}

/// Sum of line subtotals
pub fn order_total(items: &[OrderItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.subtotal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, unit_price: Decimal) -> OrderItem {
        OrderItem {
            product_id: 1,
            product_name: "x".into(),
            quantity,
            unit_price,
            subtotal: line_subtotal(unit_price, quantity).unwrap(),
        }
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let items = vec![item(2, Decimal::new(10, 0)), item(1, Decimal::new(5, 0))];
        assert_eq!(items[0].subtotal, Decimal::new(20, 0));
        assert_eq!(order_total(&items), Some(Decimal::new(25, 0)));
        assert_eq!(order_total(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_fractional_prices_do_not_drift() {
        // 3 × 0.1 is exactly 0.3 in decimal arithmetic
        let items = vec![item(3, Decimal::new(1, 1))];
        assert_eq!(order_total(&items), Some(Decimal::new(3, 1)));
    }

    #[test]
    fn test_subtotal_keeps_price_scale() {
        let price = Decimal::new(125, 3);
        assert_eq!(line_subtotal(price, 1), Some(price));
        assert_eq!(line_subtotal(price, 3), Some(Decimal::new(375, 3)));
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = Decimal::from_str("70000000000000000000000000000").unwrap();
        assert_eq!(line_subtotal(huge, 2), None);

        let items = vec![item(1, huge), item(1, huge)];
        assert_eq!(order_total(&items), None);
    }
}
