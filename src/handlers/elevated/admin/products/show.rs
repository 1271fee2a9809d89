// handlers/elevated/admin/products/show.rs - GET /api/admin/products/:id
use axum::extract::Path;
use uuid::Uuid;

use crate::database::models::product::ProductDetail;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::ProductService;

/// GET /api/admin/products/:id - Any state, soft-deleted included
pub async fn product_show(Path(id): Path<Uuid>) -> ApiResult<ProductDetail> {
    let service = ProductService::new().await?;
    let product = service.admin_detail(id).await?;

    Ok(ApiResponse::success(product))
}
