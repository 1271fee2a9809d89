// handlers/elevated/admin/products/create.rs - POST /api/admin/products
use axum::Json;
use validator::Validate;

use crate::database::models::product::{CreateProductRequest, ProductDetail};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::ProductService;

/// POST /api/admin/products - Create a product and its inventory row in one
/// transaction. The slug defaults to the slugified name.
pub async fn product_create(
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<ProductDetail> {
    request.validate()?;

    let service = ProductService::new().await?;
    let product = service.create(&request).await?;

    tracing::info!(product_id = %product.product.id, sku = %product.product.sku, "product created");
    Ok(ApiResponse::created(product))
}
