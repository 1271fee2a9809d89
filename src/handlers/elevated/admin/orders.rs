// handlers/elevated/admin/orders.rs - Order administration
use axum::extract::{Path, Query};
use axum::Json;
use uuid::Uuid;

use crate::database::models::order::{Order, OrderDetail, UpdateOrderStatusRequest};
use crate::middleware::response::{ApiResponse, ApiResult, Pagination};
use crate::services::order_service::OrderListQuery;
use crate::services::OrderService;

/// GET /api/admin/orders - All orders, filterable by status and user
pub async fn list(Query(query): Query<OrderListQuery>) -> ApiResult<Vec<Order>> {
    let service = OrderService::new().await?;
    let (orders, total, page) = service.admin_list(&query).await?;

    Ok(ApiResponse::paginated(
        orders,
        Pagination::new(page.page, page.per_page, total),
    ))
}

/// GET /api/admin/orders/:id - Any order with items and payment
pub async fn show(Path(order_id): Path<Uuid>) -> ApiResult<OrderDetail> {
    let service = OrderService::new().await?;
    let order = service.admin_get(order_id).await?;

    Ok(ApiResponse::success(order))
}

/// PUT /api/admin/orders/:id/status - Walk the order lifecycle. Cancelling
/// restocks every line in the same transaction.
pub async fn set_status(
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> ApiResult<OrderDetail> {
    let service = OrderService::new().await?;
    let order = service.admin_set_status(order_id, request.status).await?;

    Ok(ApiResponse::success(order))
}
