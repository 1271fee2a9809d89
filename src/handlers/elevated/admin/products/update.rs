// handlers/elevated/admin/products/update.rs - PUT /api/admin/products/:id
use axum::extract::Path;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::product::{Product, UpdateProductRequest};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::ProductService;

/// PUT /api/admin/products/:id - Partial update; absent fields stay as they
/// are, explicit nulls clear the nullable ones
pub async fn product_update(
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Product> {
    request.validate()?;

    let service = ProductService::new().await?;
    let product = service.update(id, &request).await?;

    Ok(ApiResponse::success(product))
}
