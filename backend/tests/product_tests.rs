//! Product creation tests
//!
//! Tests for the product + initial stock write path including:
//! - Missing/invalid input reporting
//! - SKU uniqueness (pre-check and store constraint)
//! - All-or-nothing persistence under induced failures
//! - Concurrent creates with the same SKU

use std::sync::Arc;

use async_trait::async_trait;
use inventory_backend::repository::{
    FailPoint, InventoryStore, LowStockInputs, MemoryInventoryStore, ProductWriteTx, StoreResult,
};
use inventory_backend::services::ProductService;
use inventory_backend::AppError;
use serde_json::json;
use shared::models::{CreateProductInput, ProductDetail};
use shared::types::SalesWindow;

const DEFAULT_THRESHOLD: i32 = 10;

async fn setup() -> (MemoryInventoryStore, ProductService, i64) {
    let store = MemoryInventoryStore::new();
    let warehouse_id = store.add_warehouse("Main", 1).await;
    let service = ProductService::new(Arc::new(store.clone()), DEFAULT_THRESHOLD);
    (store, service, warehouse_id)
}

fn input(sku: &str, warehouse_id: i64) -> CreateProductInput {
    CreateProductInput {
        name: Some("Widget".to_string()),
        sku: Some(sku.to_string()),
        price: Some(json!("19.99")),
        warehouse_id: Some(warehouse_id),
        initial_quantity: Some(25),
        low_stock_threshold: None,
    }
}

fn validation_message(err: &AppError) -> &str {
    match err {
        AppError::Validation { message, .. } => message,
        other => panic!("expected validation error, got {:?}", other),
    }
}

// ============================================================================
// Successful creation
// ============================================================================

#[tokio::test]
async fn test_create_product_persists_product_and_stock() {
    let (store, service, warehouse_id) = setup().await;

    let product_id = service.create_product(input("WID-001", warehouse_id)).await.unwrap();

    let detail = service.get_product(product_id).await.unwrap();
    assert_eq!(detail.product.name, "Widget");
    assert_eq!(detail.product.sku, "WID-001");
    assert_eq!(detail.product.low_stock_threshold, DEFAULT_THRESHOLD);
    assert_eq!(detail.inventory.len(), 1);
    assert_eq!(detail.inventory[0].warehouse_id, warehouse_id);
    assert_eq!(detail.inventory[0].quantity, 25);

    assert_eq!(store.product_count().await, 1);
    assert_eq!(store.inventory_count().await, 1);
}

#[tokio::test]
async fn test_price_reads_back_exactly() {
    let (_store, service, warehouse_id) = setup().await;

    let product_id = service.create_product(input("PRICE-1", warehouse_id)).await.unwrap();
    let detail = service.get_product(product_id).await.unwrap();

    assert_eq!(detail.product.price.to_string(), "19.99");
    let body = serde_json::to_value(&detail).unwrap();
    assert_eq!(body["price"], json!("19.99"));
}

#[tokio::test]
async fn test_numeric_price_is_accepted() {
    let (_store, service, warehouse_id) = setup().await;

    let mut request = input("PRICE-2", warehouse_id);
    request.price = Some(json!(4.5));
    let product_id = service.create_product(request).await.unwrap();

    let detail = service.get_product(product_id).await.unwrap();
    assert_eq!(detail.product.price.to_string(), "4.5");
}

#[tokio::test]
async fn test_explicit_threshold_and_zero_quantity() {
    let (_store, service, warehouse_id) = setup().await;

    let mut request = input("ZERO-1", warehouse_id);
    request.initial_quantity = Some(0);
    request.low_stock_threshold = Some(0);
    let product_id = service.create_product(request).await.unwrap();

    let detail = service.get_product(product_id).await.unwrap();
    assert_eq!(detail.product.low_stock_threshold, 0);
    assert_eq!(detail.inventory[0].quantity, 0);
}

#[tokio::test]
async fn test_sku_is_case_sensitive() {
    let (store, service, warehouse_id) = setup().await;

    service.create_product(input("abc-1", warehouse_id)).await.unwrap();
    service.create_product(input("ABC-1", warehouse_id)).await.unwrap();

    assert_eq!(store.product_count().await, 2);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_fields_listed_in_input_order() {
    let (store, service, _) = setup().await;

    let request = CreateProductInput {
        name: Some("Widget".to_string()),
        ..Default::default()
    };
    let err = service.create_product(request).await.unwrap_err();

    assert_eq!(
        validation_message(&err),
        "Missing fields: sku, price, warehouse_id, initial_quantity"
    );
    assert_eq!(store.product_count().await, 0);
}

#[tokio::test]
async fn test_null_and_blank_fields_count_as_missing() {
    let (_store, service, warehouse_id) = setup().await;

    let mut request = input("BLANK-1", warehouse_id);
    request.name = Some("   ".to_string());
    request.price = Some(serde_json::Value::Null);
    let err = service.create_product(request).await.unwrap_err();

    assert_eq!(validation_message(&err), "Missing fields: name, price");
}

#[tokio::test]
async fn test_malformed_price_rejected_without_writes() {
    let (store, service, warehouse_id) = setup().await;

    let mut request = input("BAD-PRICE", warehouse_id);
    request.price = Some(json!("12.x"));
    let err = service.create_product(request).await.unwrap_err();

    assert!(matches!(err, AppError::Validation { ref field, .. } if field.as_deref() == Some("price")));
    assert_eq!(validation_message(&err), "Invalid price format");
    assert_eq!(store.product_count().await, 0);
    assert_eq!(store.inventory_count().await, 0);
}

#[tokio::test]
async fn test_price_beyond_decimal_precision_rejected() {
    let (store, service, warehouse_id) = setup().await;

    let mut request = input("LONG-PRICE", warehouse_id);
    request.price = Some(json!("0.123456789012345678901234567891"));
    let err = service.create_product(request).await.unwrap_err();

    assert_eq!(validation_message(&err), "Invalid price format");
    assert_eq!(store.product_count().await, 0);
}

#[tokio::test]
async fn test_negative_price_rejected() {
    let (store, service, warehouse_id) = setup().await;

    let mut request = input("NEG-PRICE", warehouse_id);
    request.price = Some(json!("-0.01"));
    let err = service.create_product(request).await.unwrap_err();

    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(store.product_count().await, 0);
}

#[tokio::test]
async fn test_negative_quantity_rejected() {
    let (store, service, warehouse_id) = setup().await;

    let mut request = input("NEG-QTY", warehouse_id);
    request.initial_quantity = Some(-5);
    let err = service.create_product(request).await.unwrap_err();

    assert!(
        matches!(err, AppError::Validation { ref field, .. } if field.as_deref() == Some("initial_quantity"))
    );
    assert_eq!(store.product_count().await, 0);
}

// ============================================================================
// Conflicts and integrity
// ============================================================================

#[tokio::test]
async fn test_duplicate_sku_is_conflict() {
    let (store, service, warehouse_id) = setup().await;

    service.create_product(input("DUP-1", warehouse_id)).await.unwrap();
    let err = service.create_product(input("DUP-1", warehouse_id)).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
    assert_eq!(store.product_count().await, 1);
    assert_eq!(store.inventory_count().await, 1);
}

#[tokio::test]
async fn test_duplicate_sku_wins_over_malformed_price() {
    let (_store, service, warehouse_id) = setup().await;

    service.create_product(input("DUP-2", warehouse_id)).await.unwrap();
    let mut request = input("DUP-2", warehouse_id);
    request.price = Some(json!("not a price"));
    let err = service.create_product(request).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
}

#[tokio::test]
async fn test_unknown_warehouse_is_integrity_error() {
    let (store, service, _) = setup().await;

    let err = service.create_product(input("NO-WH", 999)).await.unwrap_err();

    assert!(matches!(err, AppError::Integrity(_)));
    assert_eq!(store.product_count().await, 0);
    assert_eq!(store.inventory_count().await, 0);
    assert!(store.find_by_sku("NO-WH").await.is_none());
}

/// Store whose sku pre-check never sees existing rows, as if a concurrent
/// writer committed between the check and the insert
struct StalePrecheck(MemoryInventoryStore);

#[async_trait]
impl InventoryStore for StalePrecheck {
    async fn ping(&self) -> StoreResult<()> {
        self.0.ping().await
    }

    async fn sku_exists(&self, _sku: &str) -> StoreResult<bool> {
        Ok(false)
    }

    async fn begin_product_write(&self) -> StoreResult<Box<dyn ProductWriteTx>> {
        self.0.begin_product_write().await
    }

    async fn get_product(&self, product_id: i64) -> StoreResult<Option<ProductDetail>> {
        self.0.get_product(product_id).await
    }

    async fn low_stock_inputs(
        &self,
        company_id: i64,
        window: &SalesWindow,
    ) -> StoreResult<LowStockInputs> {
        self.0.low_stock_inputs(company_id, window).await
    }
}

#[tokio::test]
async fn test_constraint_violation_after_precheck_is_conflict() {
    let (store, _, warehouse_id) = setup().await;
    let service = ProductService::new(Arc::new(StalePrecheck(store.clone())), DEFAULT_THRESHOLD);

    service.create_product(input("RACE-1", warehouse_id)).await.unwrap();
    let err = service.create_product(input("RACE-1", warehouse_id)).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }), "got {:?}", err);
    assert_eq!(store.product_count().await, 1);
}

#[tokio::test]
async fn test_sku_committed_mid_transaction_is_conflict() {
    let (store, _, warehouse_id) = setup().await;

    let mut tx = store.begin_product_write().await.unwrap();
    let product = shared::models::NewProduct {
        name: "Late".to_string(),
        sku: "RACE-2".to_string(),
        price: rust_decimal::Decimal::new(100, 2),
        low_stock_threshold: 5,
    };
    let product_id = tx.insert_product(&product).await.unwrap();
    tx.insert_inventory(&shared::models::InventoryLevel {
        product_id,
        warehouse_id,
        quantity: 1,
    })
    .await
    .unwrap();

    // A competing writer commits the same sku first
    store.add_product(product.clone()).await.unwrap();

    let err = tx.commit().await.unwrap_err();
    assert!(err.is_sku_conflict());
    assert_eq!(store.product_count().await, 1);
    assert_eq!(store.inventory_count().await, 0);
}

// ============================================================================
// Atomicity under induced failures
// ============================================================================

#[tokio::test]
async fn test_induced_failures_leave_no_partial_state() {
    let points = [
        FailPoint::SkuLookup,
        FailPoint::Begin,
        FailPoint::InsertProduct,
        FailPoint::InsertInventory,
        FailPoint::Commit,
    ];

    for point in points {
        let (store, service, warehouse_id) = setup().await;
        store.fail_at(point);

        let err = service.create_product(input("ATOMIC-1", warehouse_id)).await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)), "{:?}: got {:?}", point, err);
        assert_eq!(store.product_count().await, 0, "{:?}", point);
        assert_eq!(store.inventory_count().await, 0, "{:?}", point);

        // Failure is one-shot; a retry goes through cleanly
        service.create_product(input("ATOMIC-1", warehouse_id)).await.unwrap();
        assert_eq!(store.product_count().await, 1, "{:?}", point);
        assert_eq!(store.inventory_count().await, 1, "{:?}", point);
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_sku_exactly_one_succeeds() {
    let (store, service, warehouse_id) = setup().await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.create_product(input("HOT-SKU", warehouse_id)).await })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(store.product_count().await, 1);
    assert_eq!(store.inventory_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_skus_all_succeed() {
    let (store, service, warehouse_id) = setup().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_product(input(&format!("SKU-{}", i), warehouse_id))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.product_count().await, 8);
    assert_eq!(store.inventory_count().await, 8);
}
