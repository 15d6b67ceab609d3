//! Warehouse models

use serde::{Deserialize, Serialize};

/// A stocking location owned by one company (tenant)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
}
