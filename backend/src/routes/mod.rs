//! Route definitions for the inventory platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product management
        .nest("/products", product_routes())
        // Company-scoped reporting
        .nest("/companies", company_routes())
}

/// Product routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_product))
        .route("/:product_id", get(handlers::get_product))
}

/// Company routes
fn company_routes() -> Router<AppState> {
    Router::new().route(
        "/:company_id/alerts/low-stock",
        get(handlers::low_stock_alerts),
    )
}
