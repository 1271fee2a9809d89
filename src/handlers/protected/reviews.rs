// handlers/protected/reviews.rs - Writing and removing product reviews
use axum::extract::Path;
use axum::{Extension, Json};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::review::{CreateReviewRequest, ReviewWithAuthor};
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::{ProductService, ReviewService};

/// POST /api/products/:id/reviews - Review a live product, once per user
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Path(reference): Path<String>,
    Json(request): Json<CreateReviewRequest>,
) -> ApiResult<ReviewWithAuthor> {
    request.validate()?;

    let products = ProductService::new().await?;
    let product = products.find_visible(&reference).await?;

    let service = ReviewService::new().await?;
    let review = service.create(user.user_id, product.id, &request).await?;

    Ok(ApiResponse::created(review))
}

/// DELETE /api/products/:id/reviews/:review_id - Own review, or any review
/// for admins
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path((reference, review_id)): Path<(String, Uuid)>,
) -> ApiResult<()> {
    let service = ReviewService::new().await?;
    service
        .delete(&reference, review_id, user.user_id, user.is_admin())
        .await?;

    Ok(ApiResponse::<()>::no_content())
}
