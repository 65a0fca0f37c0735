//! Product resource handlers.

use crate::api::{run_blocking, ApiError};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use mockapi_types::{NewProduct, Product, ProductUpdate};
use std::sync::Arc;

fn product_not_found() -> ApiError {
    ApiError::NotFound("Product not found".to_string())
}

/// GET /products/
pub async fn list_products_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = run_blocking("list_products", move || state.products.list_all()).await?;
    Ok(Json(products))
}

/// GET /products/{id}
pub async fn get_product_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    run_blocking("get_product", move || state.products.get_by_id(id))
        .await?
        .map(Json)
        .ok_or_else(product_not_found)
}

/// GET /products/category/{category}
///
/// Matches the category without regard to case. No match is an empty array,
/// not a 404.
pub async fn list_products_by_category_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = run_blocking("list_products_by_category", move || {
        state.products.list_by_category(&category)
    })
    .await?;
    Ok(Json(products))
}

/// POST /products/
pub async fn create_product_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = run_blocking("create_product", move || state.products.create(&payload)).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /products/{id}
pub async fn update_product_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    run_blocking("update_product", move || state.products.update(id, &payload))
        .await?
        .map(Json)
        .ok_or_else(product_not_found)
}
