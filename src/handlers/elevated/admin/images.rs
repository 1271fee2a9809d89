// handlers/elevated/admin/images.rs - Product image management
use axum::extract::{Multipart, Path};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::product_image::{ProductImage, ReorderImagesRequest};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::MediaService;

/// POST /api/admin/products/:id/images - Multipart upload. The `file` part
/// is required, `alt_text` optional; the image format comes from sniffing
/// the bytes, never from the declared content type.
pub async fn upload(
    Path(product_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<ProductImage> {
    let mut file: Option<Vec<u8>> = None;
    let mut alt_text: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => file = Some(field.bytes().await?.to_vec()),
            Some("alt_text") => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    alt_text = Some(text);
                }
            }
            _ => {}
        }
    }

    let bytes = file.ok_or_else(|| ApiError::bad_request("multipart field 'file' is required"))?;

    let service = MediaService::new().await?;
    let image = service.upload(product_id, &bytes, alt_text).await?;

    tracing::info!(product_id = %product_id, image_id = %image.id, bytes = image.byte_size, "image uploaded");
    Ok(ApiResponse::created(image))
}

/// DELETE /api/admin/products/:id/images/:image_id - Remove an image,
/// promoting the next one when the primary goes
pub async fn delete(Path((product_id, image_id)): Path<(Uuid, Uuid)>) -> ApiResult<()> {
    let service = MediaService::new().await?;
    service.delete(product_id, image_id).await?;

    Ok(ApiResponse::<()>::no_content())
}

/// PUT /api/admin/products/:id/images/reorder - Rewrite display positions.
/// The body must list every image of the product exactly once.
pub async fn reorder(
    Path(product_id): Path<Uuid>,
    Json(request): Json<ReorderImagesRequest>,
) -> ApiResult<Vec<ProductImage>> {
    request.validate()?;

    let service = MediaService::new().await?;
    let images = service.reorder(product_id, &request.image_ids).await?;

    Ok(ApiResponse::success(images))
}

/// PUT /api/admin/products/:id/images/:image_id/primary - Move the primary
/// flag to this image
pub async fn set_primary(
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ProductImage> {
    let service = MediaService::new().await?;
    let image = service.set_primary(product_id, image_id).await?;

    Ok(ApiResponse::success(image))
}
