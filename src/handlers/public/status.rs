// handlers/public/status.rs - GET / and GET /health
use serde_json::json;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

/// GET / - Service identity and a map of the API surface
pub async fn root() -> ApiResult<serde_json::Value> {
    Ok(ApiResponse::success(json!({
        "name": "Orchard API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/auth/register, /auth/login, /auth/refresh (public)",
            "catalog": "/api/products, /api/categories (public)",
            "account": "/api/auth/whoami, /api/auth/password (protected)",
            "cart": "/api/cart (protected)",
            "checkout": "/api/checkout (protected)",
            "orders": "/api/orders (protected)",
            "addresses": "/api/addresses (protected)",
            "admin": "/api/admin/* (admin role required)",
        }
    })))
}

/// GET /health - Liveness plus a database ping. Degrades to 503 when the
/// database cannot be reached.
pub async fn health() -> ApiResult<serde_json::Value> {
    DatabaseManager::health_check()
        .await
        .map_err(ApiError::from)?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "database": "connected",
    })))
}
