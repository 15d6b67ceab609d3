//! In-process inventory store
//!
//! Keeps every table in memory behind a single lock and enforces the same
//! constraints as the PostgreSQL schema (sku uniqueness, foreign keys,
//! non-negative checks, one inventory row per product/warehouse pair).
//! Write transactions stage their rows and apply them at commit while holding
//! the write lock, so concurrent commits are serialized.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    InventoryLevel, NewProduct, Product, ProductDetail, Sale, Supplier, Warehouse,
};
use shared::types::SalesWindow;
use tokio::sync::RwLock;

use super::{
    InventoryStore, LowStockInputs, ProductWriteTx, SalesTotal, StockCandidate, StoreError,
    StoreResult, SupplierLink, SKU_UNIQUE_CONSTRAINT,
};

/// Step at which a one-shot injected failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    SkuLookup,
    Begin,
    InsertProduct,
    InsertInventory,
    Commit,
    LowStockRead,
}

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    warehouses: BTreeMap<i64, Warehouse>,
    inventory: BTreeMap<(i64, i64), InventoryLevel>,
    suppliers: BTreeMap<i64, Supplier>,
    product_suppliers: BTreeSet<(i64, i64)>,
    sales: Vec<Sale>,
}

#[derive(Debug, Default)]
struct Sequences {
    product: AtomicI64,
    warehouse: AtomicI64,
    supplier: AtomicI64,
}

impl Sequences {
    fn next(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Inventory store held entirely in memory
#[derive(Clone, Default)]
pub struct MemoryInventoryStore {
    tables: Arc<RwLock<Tables>>,
    sequences: Arc<Sequences>,
    fail_point: Arc<Mutex<Option<FailPoint>>>,
}

fn check_violation(constraint: &str) -> StoreError {
    StoreError::CheckViolation {
        constraint: constraint.to_string(),
    }
}

fn foreign_key_violation(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        constraint: constraint.to_string(),
    }
}

fn unique_violation(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a failure that fires the next time `point` is reached
    pub fn fail_at(&self, point: FailPoint) {
        *self.fail_point.lock().unwrap_or_else(PoisonError::into_inner) = Some(point);
    }

    fn trip(&self, point: FailPoint) -> StoreResult<()> {
        let mut armed = self.fail_point.lock().unwrap_or_else(PoisonError::into_inner);
        if *armed == Some(point) {
            *armed = None;
            return Err(StoreError::Unavailable(format!(
                "injected failure at {:?}",
                point
            )));
        }
        Ok(())
    }

    pub async fn add_warehouse(&self, name: &str, company_id: i64) -> i64 {
        let id = Sequences::next(&self.sequences.warehouse);
        self.tables.write().await.warehouses.insert(
            id,
            Warehouse {
                id,
                name: name.to_string(),
                company_id,
            },
        );
        id
    }

    pub async fn add_supplier(&self, name: &str, contact_email: &str) -> i64 {
        let id = Sequences::next(&self.sequences.supplier);
        self.tables.write().await.suppliers.insert(
            id,
            Supplier {
                id,
                name: name.to_string(),
                contact_email: contact_email.to_string(),
            },
        );
        id
    }

    /// Insert a product without any stock row
    pub async fn add_product(&self, product: NewProduct) -> StoreResult<i64> {
        validate_product(&product)?;

        let mut tables = self.tables.write().await;
        if tables.products.values().any(|p| p.sku == product.sku) {
            return Err(unique_violation(SKU_UNIQUE_CONSTRAINT));
        }

        let id = Sequences::next(&self.sequences.product);
        tables.products.insert(id, materialize(id, product));
        Ok(id)
    }

    pub async fn link_supplier(&self, product_id: i64, supplier_id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&product_id) {
            return Err(foreign_key_violation("product_suppliers_product_id_fkey"));
        }
        if !tables.suppliers.contains_key(&supplier_id) {
            return Err(foreign_key_violation("product_suppliers_supplier_id_fkey"));
        }
        if !tables.product_suppliers.insert((product_id, supplier_id)) {
            return Err(unique_violation("product_suppliers_pkey"));
        }
        Ok(())
    }

    /// Create or overwrite the stock row for a product at a warehouse
    pub async fn set_stock(&self, level: InventoryLevel) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if level.quantity < 0 {
            return Err(check_violation("inventory_quantity_check"));
        }
        if !tables.products.contains_key(&level.product_id) {
            return Err(foreign_key_violation("inventory_product_id_fkey"));
        }
        if !tables.warehouses.contains_key(&level.warehouse_id) {
            return Err(foreign_key_violation("inventory_warehouse_id_fkey"));
        }
        tables.inventory.insert(level.key(), level);
        Ok(())
    }

    /// Append a sale to the log
    pub async fn record_sale(&self, sale: Sale) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if sale.quantity < 0 {
            return Err(check_violation("sales_quantity_check"));
        }
        if !tables.products.contains_key(&sale.product_id) {
            return Err(foreign_key_violation("sales_product_id_fkey"));
        }
        if !tables.warehouses.contains_key(&sale.warehouse_id) {
            return Err(foreign_key_violation("sales_warehouse_id_fkey"));
        }
        tables.sales.push(sale);
        Ok(())
    }

    pub async fn product_count(&self) -> usize {
        self.tables.read().await.products.len()
    }

    pub async fn inventory_count(&self) -> usize {
        self.tables.read().await.inventory.len()
    }

    pub async fn find_by_sku(&self, sku: &str) -> Option<Product> {
        self.tables
            .read()
            .await
            .products
            .values()
            .find(|p| p.sku == sku)
            .cloned()
    }
}

fn validate_product(product: &NewProduct) -> StoreResult<()> {
    if product.price < Decimal::ZERO {
        return Err(check_violation("products_price_check"));
    }
    if product.low_stock_threshold < 0 {
        return Err(check_violation("products_low_stock_threshold_check"));
    }
    Ok(())
}

fn materialize(id: i64, product: NewProduct) -> Product {
    Product {
        id,
        name: product.name,
        sku: product.sku,
        price: product.price,
        low_stock_threshold: product.low_stock_threshold,
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn sku_exists(&self, sku: &str) -> StoreResult<bool> {
        self.trip(FailPoint::SkuLookup)?;
        let tables = self.tables.read().await;
        Ok(tables.products.values().any(|p| p.sku == sku))
    }

    async fn begin_product_write(&self) -> StoreResult<Box<dyn ProductWriteTx>> {
        self.trip(FailPoint::Begin)?;
        Ok(Box::new(MemoryProductWriteTx {
            store: self.clone(),
            products: Vec::new(),
            inventory: Vec::new(),
        }))
    }

    async fn get_product(&self, product_id: i64) -> StoreResult<Option<ProductDetail>> {
        let tables = self.tables.read().await;
        let Some(product) = tables.products.get(&product_id) else {
            return Ok(None);
        };

        let inventory = tables
            .inventory
            .range((product_id, i64::MIN)..=(product_id, i64::MAX))
            .map(|(_, level)| level.clone())
            .collect();

        Ok(Some(ProductDetail {
            product: product.clone(),
            inventory,
        }))
    }

    async fn low_stock_inputs(
        &self,
        company_id: i64,
        window: &SalesWindow,
    ) -> StoreResult<LowStockInputs> {
        self.trip(FailPoint::LowStockRead)?;

        // One read guard for all three datasets
        let tables = self.tables.read().await;
        let in_company = |warehouse_id: i64| {
            tables
                .warehouses
                .get(&warehouse_id)
                .is_some_and(|w| w.company_id == company_id)
        };

        let mut totals: BTreeMap<(i64, i64), i64> = BTreeMap::new();
        for sale in tables
            .sales
            .iter()
            .filter(|s| window.contains(s.sale_date) && in_company(s.warehouse_id))
        {
            *totals.entry((sale.product_id, sale.warehouse_id)).or_default() +=
                i64::from(sale.quantity);
        }

        let mut low_stock = Vec::new();
        for level in tables.inventory.values() {
            let (Some(product), Some(warehouse)) = (
                tables.products.get(&level.product_id),
                tables.warehouses.get(&level.warehouse_id),
            ) else {
                continue;
            };
            if warehouse.company_id != company_id || !level.is_low(product.low_stock_threshold) {
                continue;
            }
            low_stock.push(StockCandidate {
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                warehouse_id: warehouse.id,
                warehouse_name: warehouse.name.clone(),
                current_stock: level.quantity,
                threshold: product.low_stock_threshold,
            });
        }

        let product_ids: BTreeSet<i64> = low_stock.iter().map(|c| c.product_id).collect();
        let suppliers = tables
            .product_suppliers
            .iter()
            .filter(|(product_id, _)| product_ids.contains(product_id))
            .filter_map(|(product_id, supplier_id)| {
                tables.suppliers.get(supplier_id).map(|s| SupplierLink {
                    product_id: *product_id,
                    supplier: s.clone(),
                })
            })
            .collect();

        Ok(LowStockInputs {
            recent_sales: totals
                .into_iter()
                .map(|((product_id, warehouse_id), total_sold)| SalesTotal {
                    product_id,
                    warehouse_id,
                    total_sold,
                })
                .collect(),
            low_stock,
            suppliers,
        })
    }
}

/// Staged writes for one product-creation unit of work
pub struct MemoryProductWriteTx {
    store: MemoryInventoryStore,
    products: Vec<Product>,
    inventory: Vec<InventoryLevel>,
}

impl MemoryProductWriteTx {
    fn product_visible(&self, tables: &Tables, product_id: i64) -> bool {
        tables.products.contains_key(&product_id)
            || self.products.iter().any(|p| p.id == product_id)
    }

    /// Constraint checks against committed rows plus this transaction's rows
    fn check_inventory(&self, tables: &Tables, level: &InventoryLevel) -> StoreResult<()> {
        if level.quantity < 0 {
            return Err(check_violation("inventory_quantity_check"));
        }
        if !self.product_visible(tables, level.product_id) {
            return Err(foreign_key_violation("inventory_product_id_fkey"));
        }
        if !tables.warehouses.contains_key(&level.warehouse_id) {
            return Err(foreign_key_violation("inventory_warehouse_id_fkey"));
        }
        if tables.inventory.contains_key(&level.key()) {
            return Err(unique_violation("inventory_pkey"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductWriteTx for MemoryProductWriteTx {
    async fn insert_product(&mut self, product: &NewProduct) -> StoreResult<i64> {
        self.store.trip(FailPoint::InsertProduct)?;
        validate_product(product)?;

        let tables = self.store.tables.read().await;
        let taken = tables.products.values().any(|p| p.sku == product.sku)
            || self.products.iter().any(|p| p.sku == product.sku);
        if taken {
            return Err(unique_violation(SKU_UNIQUE_CONSTRAINT));
        }
        drop(tables);

        let id = Sequences::next(&self.store.sequences.product);
        self.products.push(materialize(id, product.clone()));
        Ok(id)
    }

    async fn insert_inventory(&mut self, level: &InventoryLevel) -> StoreResult<()> {
        self.store.trip(FailPoint::InsertInventory)?;

        let tables = self.store.tables.read().await;
        self.check_inventory(&tables, level)?;
        if self.inventory.iter().any(|l| l.key() == level.key()) {
            return Err(unique_violation("inventory_pkey"));
        }
        drop(tables);

        self.inventory.push(level.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.store.trip(FailPoint::Commit)?;

        let mut tables = self.store.tables.write().await;

        // Another transaction may have committed since the rows were staged
        for product in &self.products {
            if tables.products.values().any(|p| p.sku == product.sku) {
                return Err(unique_violation(SKU_UNIQUE_CONSTRAINT));
            }
        }
        for level in &self.inventory {
            self.check_inventory(&tables, level)?;
        }

        for product in &self.products {
            tables.products.insert(product.id, product.clone());
        }
        for level in &self.inventory {
            tables.inventory.insert(level.key(), level.clone());
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
