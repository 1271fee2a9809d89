// handlers/elevated/admin/products/delete.rs - DELETE /api/admin/products/:id
use axum::extract::Path;
use uuid::Uuid;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::ProductService;

/// DELETE /api/admin/products/:id - Soft delete. The row keeps its data and
/// drops out of every listing; a second delete answers 404.
pub async fn product_delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let service = ProductService::new().await?;
    service.soft_delete(id).await?;

    tracing::info!(product_id = %id, "product soft-deleted");
    Ok(ApiResponse::<()>::no_content())
}
