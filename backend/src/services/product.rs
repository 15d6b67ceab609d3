//! Product creation: a product and its initial stock row, written atomically

use std::sync::Arc;

use shared::models::{CreateProductInput, InventoryLevel, NewProduct, ProductDetail};
use shared::validation::{missing_fields_message, parse_price, validate_stock_count};

use crate::error::{AppError, AppResult};
use crate::repository::{InventoryStore, ProductWriteTx, StoreError};

/// Product service for creating and reading catalog products
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn InventoryStore>,
    default_low_stock_threshold: i32,
}

/// Request fields after presence and range checks, price still unparsed
struct CheckedInput {
    name: String,
    sku: String,
    price: serde_json::Value,
    warehouse_id: i64,
    initial_quantity: i32,
    low_stock_threshold: i32,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(store: Arc<dyn InventoryStore>, default_low_stock_threshold: i32) -> Self {
        Self {
            store,
            default_low_stock_threshold,
        }
    }

    /// Create a product together with its initial inventory row.
    ///
    /// Either both rows are committed or neither is. A duplicate sku is
    /// reported as [`AppError::Conflict`] whether it is caught by the
    /// pre-check or by the store's unique constraint at write time.
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<i64> {
        let input = self.check_input(input)?;

        if self.store.sku_exists(&input.sku).await? {
            return Err(sku_conflict(&input.sku));
        }

        let price = parse_price(&input.price)
            .map_err(|e| AppError::invalid_field("price", e.to_string()))?;

        let new_product = NewProduct {
            name: input.name,
            sku: input.sku,
            price,
            low_stock_threshold: input.low_stock_threshold,
        };

        let mut tx = self.store.begin_product_write().await?;

        let product_id = match write_rows(
            tx.as_mut(),
            &new_product,
            input.warehouse_id,
            input.initial_quantity,
        )
        .await
        {
            Ok(id) => id,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback after failed product insert failed: {}", rollback_err);
                }
                return Err(classify_write_error(e, &new_product.sku));
            }
        };

        tx.commit()
            .await
            .map_err(|e| classify_write_error(e, &new_product.sku))?;

        tracing::info!(
            product_id,
            sku = %new_product.sku,
            warehouse_id = input.warehouse_id,
            initial_quantity = input.initial_quantity,
            "Product created"
        );

        Ok(product_id)
    }

    /// Get a product with its per-warehouse stock
    pub async fn get_product(&self, product_id: i64) -> AppResult<ProductDetail> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    fn check_input(&self, input: CreateProductInput) -> AppResult<CheckedInput> {
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(missing_fields_error(&missing));
        }

        let (Some(name), Some(sku), Some(price), Some(warehouse_id), Some(initial_quantity)) = (
            input.name,
            input.sku,
            input.price,
            input.warehouse_id,
            input.initial_quantity,
        ) else {
            return Err(missing_fields_error(&missing));
        };

        let initial_quantity = validate_stock_count(initial_quantity)
            .map_err(|e| AppError::invalid_field("initial_quantity", format!("initial_quantity {}", e)))?;

        let low_stock_threshold = match input.low_stock_threshold {
            Some(value) => validate_stock_count(value).map_err(|e| {
                AppError::invalid_field("low_stock_threshold", format!("low_stock_threshold {}", e))
            })?,
            None => self.default_low_stock_threshold,
        };

        Ok(CheckedInput {
            name,
            sku,
            price,
            warehouse_id,
            initial_quantity,
            low_stock_threshold,
        })
    }
}

/// Insert the product, then its stock row keyed by the generated id
async fn write_rows(
    tx: &mut dyn ProductWriteTx,
    product: &NewProduct,
    warehouse_id: i64,
    quantity: i32,
) -> Result<i64, StoreError> {
    let product_id = tx.insert_product(product).await?;
    tx.insert_inventory(&InventoryLevel {
        product_id,
        warehouse_id,
        quantity,
    })
    .await?;
    Ok(product_id)
}

fn missing_fields_error(missing: &[&str]) -> AppError {
    AppError::validation(missing_fields_message(missing))
}

fn sku_conflict(sku: &str) -> AppError {
    AppError::Conflict {
        resource: "sku".to_string(),
        message: format!("SKU already exists: {}", sku),
    }
}

/// Map a store failure inside the write transaction onto the error taxonomy
fn classify_write_error(err: StoreError, sku: &str) -> AppError {
    if err.is_sku_conflict() {
        tracing::info!(sku, "SKU conflict detected at write time");
        return sku_conflict(sku);
    }
    if err.is_constraint_violation() {
        return AppError::Integrity(err.to_string());
    }
    AppError::Storage(err)
}
