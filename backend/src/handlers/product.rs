//! HTTP handlers for product endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{CreateProductInput, ProductCreated, ProductDetail};

use crate::error::{AppError, AppResult};
use crate::services::ProductService;
use crate::AppState;

/// Create a product with its initial stock at one warehouse
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProductCreated>)> {
    let Json(input) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let service = ProductService::new(
        state.store.clone(),
        state.config.inventory.default_low_stock_threshold,
    );
    let product_id = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(ProductCreated::new(product_id))))
}

/// Get a product with its per-warehouse stock
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let service = ProductService::new(
        state.store.clone(),
        state.config.inventory.default_low_stock_threshold,
    );
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}
