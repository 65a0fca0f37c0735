//! Mock API server library logic.

pub mod api;
pub mod api_products;
pub mod api_users;
pub mod config;

use axum::{routing::get, Extension, Json, Router};
use mockapi_db::StorageHandle;
use mockapi_records::{
    InMemoryProducts, InMemoryUsers, ProductRepository, SqliteProducts, SqliteUsers,
    UserRepository,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// User storage.
    pub users: Arc<dyn UserRepository>,
    /// Product storage.
    pub products: Arc<dyn ProductRepository>,
    /// When the server state was built; reported by `/health`.
    pub started_at: Instant,
}

impl AppState {
    /// Builds state over arbitrary repository implementations.
    pub fn new(users: Arc<dyn UserRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self {
            users,
            products,
            started_at: Instant::now(),
        }
    }

    /// Builds state backed by the SQLite store.
    pub fn sqlite(storage: StorageHandle) -> Self {
        Self::new(
            Arc::new(SqliteUsers::new(storage.clone())),
            Arc::new(SqliteProducts::new(storage)),
        )
    }

    /// Builds state backed by in-memory repositories holding the demo rows.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryUsers::with_samples()),
            Arc::new(InMemoryProducts::with_samples()),
        )
    }
}

/// Welcome handler.
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Mock FastAPI",
        "timestamp": chrono::Utc::now(),
    }))
}

/// Health check handler.
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime": state.started_at.elapsed().as_secs()
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let users = get(api_users::list_users_handler).post(api_users::create_user_handler);
    let products =
        get(api_products::list_products_handler).post(api_products::create_product_handler);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/users", users.clone())
        .route("/users/", users)
        .route(
            "/users/{id}",
            get(api_users::get_user_handler).patch(api_users::update_user_handler),
        )
        .route("/products", products.clone())
        .route("/products/", products)
        .route(
            "/products/{id}",
            get(api_products::get_product_handler).patch(api_products::update_product_handler),
        )
        .route(
            "/products/category/{category}",
            get(api_products::list_products_by_category_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
