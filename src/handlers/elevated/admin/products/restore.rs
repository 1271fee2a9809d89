// handlers/elevated/admin/products/restore.rs - POST /api/admin/products/:id/restore
use axum::extract::Path;
use uuid::Uuid;

use crate::database::models::product::Product;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::ProductService;

/// POST /api/admin/products/:id/restore - Clear `deleted_at`. Conflicts if
/// the slug or SKU was retaken while the product was deleted.
pub async fn product_restore(Path(id): Path<Uuid>) -> ApiResult<Product> {
    let service = ProductService::new().await?;
    let product = service.restore(id).await?;

    tracing::info!(product_id = %id, "product restored");
    Ok(ApiResponse::success(product))
}
