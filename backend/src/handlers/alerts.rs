//! HTTP handlers for low-stock alert endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use shared::models::LowStockAlertReport;

use crate::error::AppResult;
use crate::services::AlertService;
use crate::AppState;

/// List low-stock alerts for a company as of now
pub async fn low_stock_alerts(
    State(state): State<AppState>,
    Path(company_id): Path<i64>,
) -> AppResult<Json<LowStockAlertReport>> {
    let service = AlertService::new(state.store.clone(), state.config.alerts.recent_window_days);
    let report = service.low_stock_alerts(company_id, Utc::now()).await?;
    Ok(Json(report))
}
