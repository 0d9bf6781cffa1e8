//! Maintenance statistics

use super::order::OrderStatus;
use serde::{Deserialize, Serialize};

/// One line of the order digest shown on the maintenance page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDigest {
    pub number: String,
    pub status: OrderStatus,
    pub created_at: i64,
}

/// Store-wide counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_orders: i64,
    pub total_products: i64,
    pub total_users: i64,
    /// Number of the most recently created order
    pub last_order_number: Option<String>,
    /// Every order sorted by number
    pub orders: Vec<OrderDigest>,
}

/// Result of purging all orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeSummary {
    pub deleted: u64,
}
