//! Sales history models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single sale event. Sales are append-only and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sale {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity: i32,
    pub sale_date: DateTime<Utc>,
}
