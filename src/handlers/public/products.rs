// handlers/public/products.rs - Storefront product reads
use axum::extract::{Path, Query};
use serde_json::json;

use crate::database::models::product::{ProductDetail, ProductListItem};
use crate::database::models::product_image::ProductImage;
use crate::database::models::review::ReviewWithAuthor;
use crate::listing::{ListScope, PageQuery, ProductListQuery};
use crate::middleware::response::{ApiResponse, ApiResult, Pagination};
use crate::services::{ProductService, ReviewService};

/// GET /api/products - Paginated listing of live, active products
pub async fn list(Query(query): Query<ProductListQuery>) -> ApiResult<Vec<ProductListItem>> {
    let service = ProductService::new().await?;
    let (products, total, page) = service.list(&query, ListScope::Storefront).await?;

    Ok(ApiResponse::paginated(
        products,
        Pagination::new(page.page, page.per_page, total),
    ))
}

/// GET /api/products/:id - Product detail by UUID or slug, with images and
/// stock level
pub async fn show(Path(reference): Path<String>) -> ApiResult<ProductDetail> {
    let service = ProductService::new().await?;
    let product = service.storefront_detail(&reference).await?;

    Ok(ApiResponse::success(product))
}

/// GET /api/products/:id/images - Image list sorted by display position
pub async fn images(Path(reference): Path<String>) -> ApiResult<Vec<ProductImage>> {
    let service = ProductService::new().await?;
    let images = service.images(&reference).await?;

    Ok(ApiResponse::success(images))
}

/// GET /api/products/:id/reviews - Reviews newest first, with the rating
/// average under `meta.rating`
pub async fn reviews(
    Path(reference): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<ReviewWithAuthor>> {
    let products = ProductService::new().await?;
    let product = products.find_visible(&reference).await?;

    let page = query.resolve();
    let service = ReviewService::new().await?;
    let (reviews, total, rating) = service.list_for_product(product.id, page).await?;

    let meta = json!({
        "pagination": Pagination::new(page.page, page.per_page, total),
        "rating": rating,
    });
    Ok(ApiResponse::success(reviews).with_meta(meta))
}
