// handlers/elevated/admin/categories.rs - Category management
use axum::extract::Path;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::CategoryService;

/// POST /api/admin/categories - New category; slug defaults to the
/// slugified name, the parent must be live
pub async fn create(Json(request): Json<CreateCategoryRequest>) -> ApiResult<Category> {
    request.validate()?;

    let service = CategoryService::new().await?;
    let category = service.create(&request).await?;

    Ok(ApiResponse::created(category))
}

/// PUT /api/admin/categories/:id - Partial update; re-parenting is checked
/// against cycles
pub async fn update(
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCategoryRequest>,
) -> ApiResult<Category> {
    request.validate()?;

    let service = CategoryService::new().await?;
    let category = service.update(id, &request).await?;

    Ok(ApiResponse::success(category))
}

/// DELETE /api/admin/categories/:id - Soft delete; refused while live
/// products or live children still point here
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let service = CategoryService::new().await?;
    service.soft_delete(id).await?;

    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/admin/categories/:id/restore - Bring a deleted category back
pub async fn restore(Path(id): Path<Uuid>) -> ApiResult<Category> {
    let service = CategoryService::new().await?;
    let category = service.restore(id).await?;

    Ok(ApiResponse::success(category))
}
