//! Product catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::InventoryLevel;

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Globally unique, case-sensitive stock keeping unit
    pub sku: String,
    /// Exact decimal, serialized as a string
    pub price: Decimal,
    pub low_stock_threshold: i32,
}

/// A product together with its per-warehouse stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub inventory: Vec<InventoryLevel>,
}

/// Validated values for inserting a product row
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub low_stock_threshold: i32,
}

/// Response body for a created product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreated {
    pub message: String,
    pub product_id: i64,
}

impl ProductCreated {
    pub fn new(product_id: i64) -> Self {
        Self {
            message: "Product created".to_string(),
            product_id,
        }
    }
}

/// Request payload for creating a product with its initial stock.
///
/// Every field is optional at the type level so that missing fields can be
/// reported together, in declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    /// Decimal string or JSON number; parsed exactly
    pub price: Option<serde_json::Value>,
    pub warehouse_id: Option<i64>,
    pub initial_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
}

impl CreateProductInput {
    /// Names of required fields that are absent, null or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(self.name.as_deref()) {
            missing.push("name");
        }
        if is_blank(self.sku.as_deref()) {
            missing.push("sku");
        }
        if matches!(self.price, None | Some(serde_json::Value::Null)) {
            missing.push("price");
        }
        if self.warehouse_id.is_none() {
            missing.push("warehouse_id");
        }
        if self.initial_quantity.is_none() {
            missing.push("initial_quantity");
        }
        missing
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
