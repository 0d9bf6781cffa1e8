//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Prefix of every order number (`AP-0001`)
pub const ORDER_NUMBER_PREFIX: &str = "AP-";

/// Format a sequence number as an order number, zero-padded to 4 digits.
///
/// Numbers above 9999 simply grow wider (`AP-10000`).
pub fn format_order_number(seq: i64) -> String {
    format!("{ORDER_NUMBER_PREFIX}{seq:04}")
}

/// Parse the numeric suffix after the last hyphen. Unparseable yields 0.
pub fn order_number_suffix(number: &str) -> i64 {
    number
        .rsplit('-')
        .next()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProcess,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProcess => "in-process",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an order in this state holds its line quantities out of stock
    pub fn reserves_stock(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Parse a status coming from a client.
    ///
    /// Accepts the four canonical names and the legacy synonyms
    /// (`confirmed`, `preparing`, `ready`, `delivered`). For a legacy
    /// synonym the original word is returned as display label.
    pub fn parse_input(raw: &str) -> Option<(Self, Option<&'static str>)> {
        let normalized = raw.trim().to_ascii_lowercase();
        let parsed = match normalized.as_str() {
            "pending" => (Self::Pending, None),
            "in-process" | "in_process" => (Self::InProcess, None),
            "completed" => (Self::Completed, None),
            "cancelled" | "canceled" => (Self::Cancelled, None),
            "confirmed" => (Self::InProcess, Some("confirmed")),
            "preparing" => (Self::InProcess, Some("preparing")),
            "ready" => (Self::InProcess, Some("ready")),
            "delivered" => (Self::Completed, Some("delivered")),
            _ => return None,
        };
        Some(parsed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_input(s)
            .map(|(status, _)| status)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
    EWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank-transfer",
            Self::EWallet => "e-wallet",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "bank-transfer" => Ok(Self::BankTransfer),
            "e-wallet" => Ok(Self::EWallet),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Customer snapshot stored on the order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Customer {
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Customer email is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "Customer phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, max = 500, message = "Customer address is required"))]
    pub address: String,
}

impl Customer {
    /// Trim every field in place (whitespace-only input then fails validation)
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

/// Order line, prices frozen at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    /// Product name at order time
    pub product_name: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// quantity × unit_price
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// `AP-NNNN`, immutable once assigned
    pub number: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    /// Sum of item subtotals
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    /// Legacy display label (e.g. "ready") kept alongside the canonical status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_label: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Requested order line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct OrderLineInput {
    pub product_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

/// Create order payload
///
/// Client-sent prices, subtotals and totals are not part of the payload and
/// are ignored if present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    #[validate(nested)]
    pub customer: Customer,
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<OrderLineInput>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Update order payload (admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// Canonical status or legacy synonym
    pub status: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

/// Response of a successful order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order: Order,
    /// Present when the order number was assigned in degraded mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_format() {
        assert_eq!(format_order_number(1), "AP-0001");
        assert_eq!(format_order_number(42), "AP-0042");
        assert_eq!(format_order_number(10000), "AP-10000");
    }

    #[test]
    fn order_number_suffix_parsing() {
        assert_eq!(order_number_suffix("AP-0042"), 42);
        assert_eq!(order_number_suffix("AP-10000"), 10000);
        assert_eq!(order_number_suffix("AP-XYZ"), 0);
        assert_eq!(order_number_suffix("garbage"), 0);
    }

    #[test]
    fn legacy_status_aliases() {
        assert_eq!(
            OrderStatus::parse_input("Ready"),
            Some((OrderStatus::InProcess, Some("ready")))
        );
        assert_eq!(
            OrderStatus::parse_input("delivered"),
            Some((OrderStatus::Completed, Some("delivered")))
        );
        assert_eq!(
            OrderStatus::parse_input("cancelled"),
            Some((OrderStatus::Cancelled, None))
        );
        assert_eq!(OrderStatus::parse_input("shipped"), None);
    }

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&OrderStatus::InProcess).unwrap();
        assert_eq!(json, "\"in-process\"");
        assert!(OrderStatus::Completed.reserves_stock());
        assert!(!OrderStatus::Cancelled.reserves_stock());
    }

    #[test]
    fn create_payload_validation() {
        let payload: OrderCreate = serde_json::from_str(
            r#"{
                "customer": {"name": "Ana", "email": "ana@example.com", "phone": "300", "address": "Calle 1"},
                "items": [{"product_id": 1, "quantity": 2, "price": 999}],
                "total": 1
            }"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.payment_method, PaymentMethod::Cash);

        let empty: OrderCreate = serde_json::from_str(
            r#"{
                "customer": {"name": "Ana", "email": "", "phone": "300", "address": "Calle 1"},
                "items": []
            }"#,
        )
        .unwrap();
        assert!(empty.validate().is_err());

        let zero_qty: OrderCreate = serde_json::from_str(
            r#"{
                "customer": {"name": "Ana", "email": "ana@example.com", "phone": "300", "address": "Calle 1"},
                "items": [{"product_id": 1, "quantity": 0}]
            }"#,
        )
        .unwrap();
        assert!(zero_qty.validate().is_err());
    }
}
