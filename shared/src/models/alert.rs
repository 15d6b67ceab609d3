//! Low-stock alert models and stockout forecasting

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default length of the sales-velocity lookback, in days
pub const DEFAULT_RECENT_WINDOW_DAYS: u32 = 30;

/// Supplier contact attached to an alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSupplier {
    pub id: i64,
    pub name: String,
    pub contact_email: String,
}

/// A (product, warehouse, supplier) row whose stock is at or below threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LowStockAlert {
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: i64,
    pub warehouse_name: String,
    pub current_stock: i32,
    pub threshold: i32,
    pub days_until_stockout: Option<i64>,
    pub supplier: AlertSupplier,
}

/// Response envelope for the low-stock alert listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LowStockAlertReport {
    pub alerts: Vec<LowStockAlert>,
    pub total_alerts: usize,
}

impl LowStockAlertReport {
    pub fn new(alerts: Vec<LowStockAlert>) -> Self {
        let total_alerts = alerts.len();
        Self {
            alerts,
            total_alerts,
        }
    }
}

/// Average units sold per day over the window
pub fn average_daily_sales(total_sold: i64, window_days: u32) -> Decimal {
    if window_days == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(total_sold) / Decimal::from(window_days)
}

/// Estimated days until stock runs out at the recent sales rate.
///
/// Returns `None` unless the average daily sales rate is strictly positive.
/// The result is rounded half away from zero. Computed as
/// `current_stock * window_days / total_sold`, which equals
/// `current_stock / average_daily_sales` without an inexact intermediate.
pub fn days_until_stockout(current_stock: i32, total_sold: i64, window_days: u32) -> Option<i64> {
    if average_daily_sales(total_sold, window_days) <= Decimal::ZERO {
        return None;
    }

    let days = Decimal::from(current_stock) * Decimal::from(window_days) / Decimal::from(total_sold);
    days.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
