// handlers/elevated/admin/products/list.rs - GET /api/admin/products
use axum::extract::Query;

use crate::database::models::product::ProductListItem;
use crate::listing::{ListScope, ProductListQuery};
use crate::middleware::response::{ApiResponse, ApiResult, Pagination};
use crate::services::ProductService;

/// GET /api/admin/products - Same filter surface as the storefront listing,
/// plus `status` and `include_deleted`
pub async fn product_list(
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Vec<ProductListItem>> {
    let service = ProductService::new().await?;
    let (products, total, page) = service.list(&query, ListScope::Admin).await?;

    Ok(ApiResponse::paginated(
        products,
        Pagination::new(page.page, page.per_page, total),
    ))
}
