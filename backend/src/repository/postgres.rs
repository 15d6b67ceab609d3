//! PostgreSQL implementation of the inventory store

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{InventoryLevel, NewProduct, Product, ProductDetail, Supplier};
use shared::types::SalesWindow;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{
    InventoryStore, LowStockInputs, ProductWriteTx, SalesTotal, StockCandidate, StoreResult,
    SupplierLink,
};

/// Inventory store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgInventoryStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    sku: String,
    price: Decimal,
    low_stock_threshold: i32,
}

#[derive(Debug, FromRow)]
struct InventoryRow {
    product_id: i64,
    warehouse_id: i64,
    quantity: i32,
}

#[derive(Debug, FromRow)]
struct SalesTotalRow {
    product_id: i64,
    warehouse_id: i64,
    total_sold: i64,
}

#[derive(Debug, FromRow)]
struct StockCandidateRow {
    product_id: i64,
    product_name: String,
    sku: String,
    warehouse_id: i64,
    warehouse_name: String,
    current_stock: i32,
    threshold: i32,
}

#[derive(Debug, FromRow)]
struct SupplierLinkRow {
    product_id: i64,
    supplier_id: i64,
    supplier_name: String,
    contact_email: String,
}

impl PgInventoryStore {
    /// Create a new PgInventoryStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn sku_exists(&self, sku: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)",
        )
        .bind(sku)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn begin_product_write(&self) -> StoreResult<Box<dyn ProductWriteTx>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgProductWriteTx { tx }))
    }

    async fn get_product(&self, product_id: i64) -> StoreResult<Option<ProductDetail>> {
        let Some(row) = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, sku, price, low_stock_threshold
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        else {
            return Ok(None);
        };

        let inventory = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT product_id, warehouse_id, quantity
            FROM inventory
            WHERE product_id = $1
            ORDER BY warehouse_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(ProductDetail {
            product: Product {
                id: row.id,
                name: row.name,
                sku: row.sku,
                price: row.price,
                low_stock_threshold: row.low_stock_threshold,
            },
            inventory: inventory
                .into_iter()
                .map(|r| InventoryLevel {
                    product_id: r.product_id,
                    warehouse_id: r.warehouse_id,
                    quantity: r.quantity,
                })
                .collect(),
        }))
    }

    async fn low_stock_inputs(
        &self,
        company_id: i64,
        window: &SalesWindow,
    ) -> StoreResult<LowStockInputs> {
        let mut tx = self.db.begin().await?;

        // All three reads must see the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let recent_sales = sqlx::query_as::<_, SalesTotalRow>(
            r#"
            SELECT s.product_id, s.warehouse_id, SUM(s.quantity)::BIGINT AS total_sold
            FROM sales s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE w.company_id = $1
              AND s.sale_date >= $2
              AND s.sale_date < $3
            GROUP BY s.product_id, s.warehouse_id
            "#,
        )
        .bind(company_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&mut *tx)
        .await?;

        let low_stock = sqlx::query_as::<_, StockCandidateRow>(
            r#"
            SELECT i.product_id, p.name AS product_name, p.sku,
                   i.warehouse_id, w.name AS warehouse_name,
                   i.quantity AS current_stock, p.low_stock_threshold AS threshold
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            JOIN warehouses w ON w.id = i.warehouse_id
            WHERE w.company_id = $1
              AND i.quantity <= p.low_stock_threshold
            "#,
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut product_ids: Vec<i64> = low_stock.iter().map(|r| r.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        let suppliers = if product_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, SupplierLinkRow>(
                r#"
                SELECT ps.product_id, s.id AS supplier_id, s.name AS supplier_name, s.contact_email
                FROM product_suppliers ps
                JOIN suppliers s ON s.id = ps.supplier_id
                WHERE ps.product_id = ANY($1)
                "#,
            )
            .bind(&product_ids)
            .fetch_all(&mut *tx)
            .await?
        };

        tx.commit().await?;

        Ok(LowStockInputs {
            recent_sales: recent_sales
                .into_iter()
                .map(|r| SalesTotal {
                    product_id: r.product_id,
                    warehouse_id: r.warehouse_id,
                    total_sold: r.total_sold,
                })
                .collect(),
            low_stock: low_stock
                .into_iter()
                .map(|r| StockCandidate {
                    product_id: r.product_id,
                    product_name: r.product_name,
                    sku: r.sku,
                    warehouse_id: r.warehouse_id,
                    warehouse_name: r.warehouse_name,
                    current_stock: r.current_stock,
                    threshold: r.threshold,
                })
                .collect(),
            suppliers: suppliers
                .into_iter()
                .map(|r| SupplierLink {
                    product_id: r.product_id,
                    supplier: Supplier {
                        id: r.supplier_id,
                        name: r.supplier_name,
                        contact_email: r.contact_email,
                    },
                })
                .collect(),
        })
    }
}

/// Write transaction over a pooled PostgreSQL connection
pub struct PgProductWriteTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProductWriteTx for PgProductWriteTx {
    async fn insert_product(&mut self, product: &NewProduct) -> StoreResult<i64> {
        let product_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products (name, sku, price, low_stock_threshold)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price)
        .bind(product.low_stock_threshold)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(product_id)
    }

    async fn insert_inventory(&mut self, level: &InventoryLevel) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (product_id, warehouse_id, quantity)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(level.product_id)
        .bind(level.warehouse_id)
        .bind(level.quantity)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
