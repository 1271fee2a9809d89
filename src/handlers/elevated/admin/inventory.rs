// handlers/elevated/admin/inventory.rs - Stock management
use axum::extract::Path;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::inventory::{AdjustInventoryRequest, Inventory, LowStockItem};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::InventoryService;

/// PUT /api/admin/inventory/:product_id - Set stock absolutely or nudge it
/// by a delta; the result may never go negative
pub async fn adjust(
    Path(product_id): Path<Uuid>,
    Json(request): Json<AdjustInventoryRequest>,
) -> ApiResult<Inventory> {
    request.validate()?;

    let service = InventoryService::new().await?;
    let inventory = service.adjust(product_id, &request).await?;

    tracing::info!(product_id = %product_id, quantity = inventory.quantity, "stock adjusted");
    Ok(ApiResponse::success(inventory))
}

/// GET /api/admin/inventory/low-stock - Live products at or below their
/// low-stock threshold, emptiest first
pub async fn low_stock() -> ApiResult<Vec<LowStockItem>> {
    let service = InventoryService::new().await?;
    let items = service.low_stock().await?;

    Ok(ApiResponse::success(items))
}
