//! Inventory (on-hand stock) models

use serde::{Deserialize, Serialize};

/// Current on-hand stock for a product at a warehouse.
///
/// Identity is the `(product_id, warehouse_id)` pair; there is at most one
/// row per pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryLevel {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity: i32,
}

impl InventoryLevel {
    pub fn key(&self) -> (i64, i64) {
        (self.product_id, self.warehouse_id)
    }

    /// Whether stock is at or below the given threshold
    pub fn is_low(&self, threshold: i32) -> bool {
        self.quantity <= threshold
    }
}
