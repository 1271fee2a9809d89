// handlers/protected/orders.rs - Order history for the signed-in user
use axum::extract::{Path, Query};
use axum::Extension;
use uuid::Uuid;

use crate::database::models::order::{Order, OrderDetail};
use crate::listing::PageQuery;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult, Pagination};
use crate::services::OrderService;

/// GET /api/orders - Own orders, newest first
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<Order>> {
    let page = query.resolve();
    let service = OrderService::new().await?;
    let (orders, total) = service.list_mine(user.user_id, page).await?;

    Ok(ApiResponse::paginated(
        orders,
        Pagination::new(page.page, page.per_page, total),
    ))
}

/// GET /api/orders/:id - Own order with items and payment
pub async fn show(
    Extension(user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<OrderDetail> {
    let service = OrderService::new().await?;
    let order = service.get_mine(user.user_id, order_id).await?;

    Ok(ApiResponse::success(order))
}

/// POST /api/orders/:id/cancel - Cancel a pending or paid order, restocking
/// its lines
pub async fn cancel(
    Extension(user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<OrderDetail> {
    let service = OrderService::new().await?;
    let order = service.cancel_mine(user.user_id, order_id).await?;

    Ok(ApiResponse::success(order))
}
