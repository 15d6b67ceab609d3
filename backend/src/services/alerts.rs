//! Low-stock alert engine
//!
//! Alerts are built in stages: recent sales are summed per
//! (product, warehouse), then joined against inventory rows at or below
//! threshold, then fanned out once per supplier. Each join is an inner join,
//! so a pair with no recent sales, or a product with no supplier, produces no
//! alert at all.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::models::{days_until_stockout, AlertSupplier, LowStockAlert, LowStockAlertReport, Supplier};
use shared::types::SalesWindow;

use crate::error::AppResult;
use crate::repository::{InventoryStore, LowStockInputs};

/// Alert service computing low-stock alerts per company
#[derive(Clone)]
pub struct AlertService {
    store: Arc<dyn InventoryStore>,
    window_days: u32,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(store: Arc<dyn InventoryStore>, window_days: u32) -> Self {
        Self { store, window_days }
    }

    /// Low-stock alerts for one company as of the given instant.
    ///
    /// Alerts are ordered by product id, then warehouse id, then supplier id.
    pub async fn low_stock_alerts(
        &self,
        company_id: i64,
        as_of: DateTime<Utc>,
    ) -> AppResult<LowStockAlertReport> {
        let window = SalesWindow::ending_at(as_of, self.window_days);
        let inputs = self.store.low_stock_inputs(company_id, &window).await?;

        let alerts = build_alerts(inputs, window.days);

        tracing::debug!(
            company_id,
            window_start = %window.start,
            alerts = alerts.len(),
            "Computed low-stock alerts"
        );

        Ok(LowStockAlertReport::new(alerts))
    }
}

/// Join the staged datasets into alert rows
pub fn build_alerts(inputs: LowStockInputs, window_days: u32) -> Vec<LowStockAlert> {
    let mut sold: HashMap<(i64, i64), i64> = HashMap::new();
    for total in &inputs.recent_sales {
        *sold.entry((total.product_id, total.warehouse_id)).or_default() += total.total_sold;
    }

    let mut suppliers_by_product: BTreeMap<i64, Vec<Supplier>> = BTreeMap::new();
    for link in inputs.suppliers {
        suppliers_by_product
            .entry(link.product_id)
            .or_default()
            .push(link.supplier);
    }
    for suppliers in suppliers_by_product.values_mut() {
        suppliers.sort_by_key(|s| s.id);
    }

    let mut candidates = inputs.low_stock;
    candidates.sort_by_key(|c| (c.product_id, c.warehouse_id));

    let mut alerts = Vec::new();
    for candidate in candidates {
        if candidate.current_stock > candidate.threshold {
            continue;
        }
        let Some(&total_sold) = sold.get(&(candidate.product_id, candidate.warehouse_id)) else {
            continue;
        };
        let Some(suppliers) = suppliers_by_product.get(&candidate.product_id) else {
            continue;
        };

        let days = days_until_stockout(candidate.current_stock, total_sold, window_days);

        for supplier in suppliers {
            alerts.push(LowStockAlert {
                product_id: candidate.product_id,
                product_name: candidate.product_name.clone(),
                sku: candidate.sku.clone(),
                warehouse_id: candidate.warehouse_id,
                warehouse_name: candidate.warehouse_name.clone(),
                current_stock: candidate.current_stock,
                threshold: candidate.threshold,
                days_until_stockout: days,
                supplier: AlertSupplier {
                    id: supplier.id,
                    name: supplier.name.clone(),
                    contact_email: supplier.contact_email.clone(),
                },
            });
        }
    }

    alerts
}
