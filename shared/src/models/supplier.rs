//! Supplier models

use serde::{Deserialize, Serialize};

/// A supplier that can restock products
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_email: String,
}
