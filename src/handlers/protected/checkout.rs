// handlers/protected/checkout.rs - POST /api/checkout
use axum::http::StatusCode;
use axum::{Extension, Json};
use validator::Validate;

use crate::database::models::order::CheckoutRequest;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::{CheckoutResult, OrderService};

/// POST /api/checkout - Turn the cart into a paid order. A fresh order
/// answers 201; replaying a previously seen idempotency key answers 200 with
/// the original order.
pub async fn checkout(
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<CheckoutResult> {
    request.validate()?;

    let service = OrderService::new().await?;
    let result = service.checkout(user.user_id, &request).await?;

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok(ApiResponse::with_status(result, status))
}
