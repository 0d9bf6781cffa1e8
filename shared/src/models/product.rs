//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Placeholder image used when a product is created without one
pub const DEFAULT_PRODUCT_IMAGE: &str = "/placeholder.svg?height=300&width=300";

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    Honey,
    Pollen,
    Propolis,
    Wax,
    RoyalJelly,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Honey => "honey",
            Self::Pollen => "pollen",
            Self::Propolis => "propolis",
            Self::Wax => "wax",
            Self::RoyalJelly => "royal-jelly",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "honey" => Ok(Self::Honey),
            "pollen" => Ok(Self::Pollen),
            "propolis" => Ok(Self::Propolis),
            "wax" => Ok(Self::Wax),
            "royal-jelly" => Ok(Self::RoyalJelly),
            other => Err(format!("unknown product category: {other}")),
        }
    }
}

/// Unit of measure the price refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    #[default]
    Kg,
    G,
    Ml,
    L,
    Unit,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::G => "g",
            Self::Ml => "ml",
            Self::L => "l",
            Self::Unit => "unit",
        }
    }
}

impl FromStr for UnitOfMeasure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Self::Kg),
            "g" => Ok(Self::G),
            "ml" => Ok(Self::Ml),
            "l" => Ok(Self::L),
            "unit" => Ok(Self::Unit),
            other => Err(format!("unknown unit of measure: {other}")),
        }
    }
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price in currency unit
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Units on hand, never negative
    pub stock: i64,
    pub category: ProductCategory,
    pub unit: UnitOfMeasure,
    pub image: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,
    pub category: ProductCategory,
    #[serde(default)]
    pub unit: UnitOfMeasure,
    pub image: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200, message = "Product name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Absolute stock level requested by the admin
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,
    pub category: Option<ProductCategory>,
    pub unit: Option<UnitOfMeasure>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// Relative stock adjustment payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names() {
        let json = serde_json::to_string(&ProductCategory::RoyalJelly).unwrap();
        assert_eq!(json, "\"royal-jelly\"");
        assert_eq!(
            "royal-jelly".parse::<ProductCategory>().unwrap(),
            ProductCategory::RoyalJelly
        );
        assert!("mead".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn create_payload_defaults_and_validation() {
        let payload: ProductCreate = serde_json::from_str(
            r#"{"name":"Wildflower honey","price":25000,"category":"honey"}"#,
        )
        .unwrap();
        assert_eq!(payload.unit, UnitOfMeasure::Kg);
        assert_eq!(payload.stock, 0);
        assert!(payload.validate().is_ok());

        let bad: ProductCreate =
            serde_json::from_str(r#"{"name":"","price":1,"stock":-1,"category":"wax"}"#).unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("stock"));
    }

    #[test]
    fn price_serializes_as_number() {
        let payload = ProductCreate {
            name: "Pollen".into(),
            description: String::new(),
            price: Decimal::new(3550, 2),
            stock: 3,
            category: ProductCategory::Pollen,
            unit: UnitOfMeasure::G,
            image: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["price"], 35.5);
    }
}
