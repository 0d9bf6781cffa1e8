//! Order Ledger
//!
//! # Components
//!
//! - [`ledger`] - order lifecycle: create, status transitions, delete
//! - [`numbering`] - `AP-NNNN` number assignment per numbering epoch
//! - [`money`] - decimal subtotal / total computation
//! - [`error`] - [`LedgerError`] and its mapping onto `AppError`
//!
//! Every operation runs in one SQLite transaction: number assignment, order
//! row and stock adjustments commit together or not at all.

pub mod error;
pub mod ledger;
pub mod money;
pub mod numbering;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{
    create_order, delete_order, get_order, list_orders, set_status, update_order,
};

use std::fmt;
use std::str::FromStr;

/// How a caller names an order: internal id or `AP-NNNN` code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    Id(i64),
    Number(String),
}

impl OrderRef {
    /// Normalize a user supplied code (`ap-0001 ` -> `AP-0001`)
    pub fn number(code: &str) -> Self {
        OrderRef::Number(code.trim().to_uppercase())
    }
}

impl FromStr for OrderRef {
    type Err = std::convert::Infallible;

    /// All-digit input is an id, anything else an order code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty()
            && trimmed.bytes().all(|b| b.is_ascii_digit())
            && let Ok(id) = trimmed.parse::<i64>()
        {
            return Ok(OrderRef::Id(id));
        }
        Ok(OrderRef::number(trimmed))
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRef::Id(id) => write!(f, "{id}"),
            OrderRef::Number(number) => f.write_str(number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ref_parsing() {
        assert_eq!("42".parse::<OrderRef>().unwrap(), OrderRef::Id(42));
        assert_eq!(
            " ap-0007 ".parse::<OrderRef>().unwrap(),
            OrderRef::Number("AP-0007".into())
        );
        assert_eq!(
            "99999999999999999999".parse::<OrderRef>().unwrap(),
            OrderRef::Number("99999999999999999999".into())
        );
    }
}
