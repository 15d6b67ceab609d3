//! Data access layer for products, stock, suppliers and sales
//!
//! Services talk to storage only through [`InventoryStore`]. Two
//! implementations are provided: [`PgInventoryStore`] over a PostgreSQL pool
//! and [`MemoryInventoryStore`] for tests and local runs.

use async_trait::async_trait;
use shared::models::{InventoryLevel, NewProduct, ProductDetail, Supplier};
use shared::types::SalesWindow;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::{FailPoint, MemoryInventoryStore};
pub use postgres::PgInventoryStore;

/// Name of the unique constraint on `products.sku`
pub const SKU_UNIQUE_CONSTRAINT: &str = "products_sku_key";

/// Store failures, classified so callers can tell constraint violations apart
/// from infrastructure problems
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    #[error("store operation timed out")]
    Timeout,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Whether this is a uniqueness/referential/check violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { .. }
                | StoreError::ForeignKeyViolation { .. }
                | StoreError::CheckViolation { .. }
        )
    }

    /// Whether this is the sku uniqueness violation
    pub fn is_sku_conflict(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == SKU_UNIQUE_CONSTRAINT)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation { constraint };
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation { constraint };
            }
            if db_err.is_check_violation() {
                return StoreError::CheckViolation { constraint };
            }
        }

        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".to_string()),
            sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Recent sales summed per (product, warehouse)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesTotal {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub total_sold: i64,
}

/// An inventory row at or below its product's threshold, with display names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCandidate {
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: i64,
    pub warehouse_name: String,
    pub current_stock: i32,
    pub threshold: i32,
}

/// A supplier linked to a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierLink {
    pub product_id: i64,
    pub supplier: Supplier,
}

/// Datasets for the low-stock alert join, read from one snapshot
#[derive(Debug, Clone, Default)]
pub struct LowStockInputs {
    pub recent_sales: Vec<SalesTotal>,
    pub low_stock: Vec<StockCandidate>,
    pub suppliers: Vec<SupplierLink>,
}

/// Storage contract used by the services
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Cheap connectivity probe
    async fn ping(&self) -> StoreResult<()>;

    async fn sku_exists(&self, sku: &str) -> StoreResult<bool>;

    /// Open an atomic unit of work for creating a product and its stock
    async fn begin_product_write(&self) -> StoreResult<Box<dyn ProductWriteTx>>;

    async fn get_product(&self, product_id: i64) -> StoreResult<Option<ProductDetail>>;

    /// Read recent sales totals, low-stock rows and supplier links for one
    /// company, all from the same snapshot
    async fn low_stock_inputs(
        &self,
        company_id: i64,
        window: &SalesWindow,
    ) -> StoreResult<LowStockInputs>;
}

/// An open write transaction. Dropping it without `commit` discards all
/// writes made through it.
#[async_trait]
pub trait ProductWriteTx: Send {
    /// Insert a product row and return its generated id
    async fn insert_product(&mut self, product: &NewProduct) -> StoreResult<i64>;

    async fn insert_inventory(&mut self, level: &InventoryLevel) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
