// handlers/protected/cart.rs - Shopping cart operations
//
// Cart lines are addressed by product id, so clients never need to learn
// cart-item ids.
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::cart::{AddCartItemRequest, CartView, UpdateCartItemRequest};
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::CartService;

/// Render a cart with its totals under `meta.totals`
fn cart_response(view: CartView, status: StatusCode) -> ApiResponse<CartView> {
    let meta = json!({
        "totals": {
            "subtotal": view.subtotal,
            "item_count": view.item_count,
        }
    });
    ApiResponse::with_status(view, status).with_meta(meta)
}

/// GET /api/cart - The user's cart, created lazily on first read
pub async fn show(Extension(user): Extension<AuthUser>) -> ApiResult<CartView> {
    let service = CartService::new().await?;
    let view = service.view(user.user_id).await?;

    Ok(cart_response(view, StatusCode::OK))
}

/// POST /api/cart/items - Add a product, merging with an existing line
pub async fn add_item(
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AddCartItemRequest>,
) -> ApiResult<CartView> {
    request.validate()?;

    let service = CartService::new().await?;
    let view = service
        .add_item(user.user_id, request.product_id, request.quantity)
        .await?;

    Ok(cart_response(view, StatusCode::CREATED))
}

/// PUT /api/cart/items/:product_id - Set a line's quantity; zero removes it
pub async fn update_item(
    Extension(user): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<UpdateCartItemRequest>,
) -> ApiResult<CartView> {
    request.validate()?;

    let service = CartService::new().await?;
    let view = service
        .update_item(user.user_id, product_id, request.quantity)
        .await?;

    Ok(cart_response(view, StatusCode::OK))
}

/// DELETE /api/cart/items/:product_id - Drop one line
pub async fn remove_item(
    Extension(user): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<()> {
    let service = CartService::new().await?;
    service.remove_item(user.user_id, product_id).await?;

    Ok(ApiResponse::<()>::no_content())
}

/// DELETE /api/cart - Empty the cart
pub async fn clear(Extension(user): Extension<AuthUser>) -> ApiResult<()> {
    let service = CartService::new().await?;
    service.clear(user.user_id).await?;

    Ok(ApiResponse::<()>::no_content())
}
