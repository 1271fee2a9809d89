// handlers/public/categories.rs - Category reads
use axum::extract::{Path, Query};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::category::CategoryWithCount;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::CategoryService;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    pub tree: Option<bool>,
}

/// GET /api/categories - Flat list by default; `?tree=true` nests children
pub async fn list(Query(query): Query<CategoryListQuery>) -> ApiResult<Value> {
    let service = CategoryService::new().await?;

    let data = if query.tree.unwrap_or(false) {
        serde_json::to_value(service.tree().await?)
    } else {
        serde_json::to_value(service.list().await?)
    }
    .map_err(|e| {
        tracing::error!("category serialization failed: {}", e);
        crate::error::ApiError::internal("Failed to format response")
    })?;

    Ok(ApiResponse::success(data))
}

/// GET /api/categories/:id - By UUID or slug, with its live product count
pub async fn show(Path(reference): Path<String>) -> ApiResult<CategoryWithCount> {
    let service = CategoryService::new().await?;
    let category = service.get(&reference).await?;

    Ok(ApiResponse::success(category))
}
