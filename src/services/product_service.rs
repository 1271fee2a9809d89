use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::field_error;

use crate::database::manager::DatabaseManager;
use crate::database::models::inventory::Inventory;
use crate::database::models::product::{
    CreateProductRequest, Product, ProductDetail, ProductListItem, ProductStatus,
    UpdateProductRequest,
};
use crate::database::models::product_image::ProductImage;
use crate::error::ApiError;
use crate::listing::{
    bind_param_query_as, bind_param_query_scalar, ListScope, Page, ParamBinder, ProductListQuery,
    SqlParam,
};

pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Paged listing. The WHERE/ORDER fragments come from the query builder;
    /// each row carries the stock level and primary image alongside the
    /// product columns.
    pub async fn list(
        &self,
        query: &ProductListQuery,
        scope: ListScope,
    ) -> Result<(Vec<ProductListItem>, i64, Page), ApiError> {
        let sql = query.build(scope)?;

        let count_sql = format!("SELECT COUNT(*) FROM products p WHERE {}", sql.where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in &sql.params {
            count_query = bind_param_query_scalar(count_query, param);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            r#"
            SELECT p.*, i.quantity AS quantity, pi.url AS primary_image_url
            FROM products p
            LEFT JOIN inventory i ON i.product_id = p.id
            LEFT JOIN product_images pi ON pi.product_id = p.id AND pi.is_primary
            WHERE {}
            ORDER BY {}
            {}
            "#,
            sql.where_sql, sql.order_sql, sql.limit_sql
        );
        let mut list_query = sqlx::query_as::<_, ProductListItem>(&list_sql);
        for param in &sql.params {
            list_query = bind_param_query_as(list_query, param);
        }
        let items = list_query.fetch_all(&self.pool).await?;

        Ok((items, total, sql.page))
    }

    /// Storefront detail, addressed by UUID or slug. Only live, active
    /// products are visible here.
    pub async fn storefront_detail(&self, reference: &str) -> Result<ProductDetail, ApiError> {
        let product = self.find_visible(reference).await?;
        self.assemble_detail(product).await
    }

    /// Admin detail by id, soft-deleted rows included
    pub async fn admin_detail(&self, id: Uuid) -> Result<ProductDetail, ApiError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;
        self.assemble_detail(product).await
    }

    /// Images of a storefront-visible product, in display order
    pub async fn images(&self, reference: &str) -> Result<Vec<ProductImage>, ApiError> {
        let product = self.find_visible(reference).await?;
        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT * FROM product_images WHERE product_id = $1 ORDER BY position ASC",
        )
        .bind(product.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    /// Resolve a storefront reference (UUID or slug) to a live, active product
    pub async fn find_visible(&self, reference: &str) -> Result<Product, ApiError> {
        let product = match Uuid::parse_str(reference) {
            Ok(id) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL AND status = 'active'",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            Err(_) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE slug = $1 AND deleted_at IS NULL AND status = 'active'",
                )
                .bind(reference)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        product.ok_or_else(|| ApiError::not_found("Product not found"))
    }

    /// Create a product and its inventory row in one transaction.
    pub async fn create(&self, request: &CreateProductRequest) -> Result<ProductDetail, ApiError> {
        check_prices(request.price, request.compare_at_price)?;

        let slug = match &request.slug {
            Some(slug) => slug.trim().to_string(),
            None => super::slugify(&request.name),
        };
        if slug.is_empty() {
            return Err(field_error("slug", "a slug could not be derived from the name; provide one"));
        }

        if let Some(category_id) = request.category_id {
            self.ensure_live_category(category_id).await?;
        }

        self.ensure_sku_free(&request.sku, None).await?;
        self.ensure_slug_free(&slug, None).await?;

        let status = request.status.unwrap_or(ProductStatus::Draft);

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, slug, sku, description, price, compare_at_price, status, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.name.trim())
        .bind(&slug)
        .bind(request.sku.trim())
        .bind(&request.description)
        .bind(request.price)
        .bind(request.compare_at_price)
        .bind(status)
        .bind(request.category_id)
        .fetch_one(&mut *tx)
        .await;

        let product = match inserted {
            Ok(product) => product,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(map_product_unique_violation(db_err.constraint()));
            }
            Err(other) => return Err(other.into()),
        };

        let inventory = sqlx::query_as::<_, Inventory>(
            "INSERT INTO inventory (product_id, quantity) VALUES ($1, $2) RETURNING *",
        )
        .bind(product.id)
        .bind(request.initial_quantity.unwrap_or(0))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "created product");

        Ok(ProductDetail {
            product,
            inventory: Some(inventory),
            images: vec![],
        })
    }

    /// Partial update of a live product. Slug/SKU uniqueness is re-checked
    /// when those fields change.
    pub async fn update(&self, id: Uuid, request: &UpdateProductRequest) -> Result<Product, ApiError> {
        let current = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

        let new_price = request.price.unwrap_or(current.price);
        let new_compare = match &request.compare_at_price {
            None => current.compare_at_price,
            Some(value) => *value,
        };
        check_prices(new_price, new_compare)?;

        if let Some(sku) = &request.sku {
            if sku.trim() != current.sku {
                self.ensure_sku_free(sku.trim(), Some(id)).await?;
            }
        }
        if let Some(slug) = &request.slug {
            if slug.trim() != current.slug {
                self.ensure_slug_free(slug.trim(), Some(id)).await?;
            }
        }
        if let Some(Some(category_id)) = request.category_id {
            self.ensure_live_category(category_id).await?;
        }

        let mut binder = ParamBinder::new();
        let mut sets: Vec<String> = vec![];

        if let Some(name) = &request.name {
            let ph = binder.push(SqlParam::Str(name.trim().to_string()));
            sets.push(format!("name = {}", ph));
        }
        if let Some(slug) = &request.slug {
            let ph = binder.push(SqlParam::Str(slug.trim().to_string()));
            sets.push(format!("slug = {}", ph));
        }
        if let Some(sku) = &request.sku {
            let ph = binder.push(SqlParam::Str(sku.trim().to_string()));
            sets.push(format!("sku = {}", ph));
        }
        if let Some(description) = &request.description {
            let ph = binder.push(SqlParam::Str(description.clone()));
            sets.push(format!("description = {}", ph));
        }
        if let Some(price) = request.price {
            let ph = binder.push(SqlParam::Dec(price));
            sets.push(format!("price = {}", ph));
        }
        match request.compare_at_price {
            None => {}
            Some(None) => sets.push("compare_at_price = NULL".to_string()),
            Some(Some(value)) => {
                let ph = binder.push(SqlParam::Dec(value));
                sets.push(format!("compare_at_price = {}", ph));
            }
        }
        if let Some(status) = request.status {
            let ph = binder.push(SqlParam::Str(status.as_str().to_string()));
            sets.push(format!("status = {}::product_status", ph));
        }
        match request.category_id {
            None => {}
            Some(None) => sets.push("category_id = NULL".to_string()),
            Some(Some(category_id)) => {
                let ph = binder.push(SqlParam::Uuid(category_id));
                sets.push(format!("category_id = {}", ph));
            }
        }

        if sets.is_empty() {
            return Ok(current);
        }
        sets.push("updated_at = now()".to_string());

        let id_ph = binder.push(SqlParam::Uuid(id));
        let sql = format!(
            "UPDATE products SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id_ph
        );

        let mut update_query = sqlx::query_as::<_, Product>(&sql);
        for param in &binder.into_values() {
            update_query = bind_param_query_as(update_query, param);
        }

        match update_query.fetch_one(&self.pool).await {
            Ok(product) => Ok(product),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(map_product_unique_violation(db_err.constraint()))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Soft delete: the row keeps its data but drops out of every listing
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = now(), updated_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Product not found"));
        }
        tracing::info!(product_id = %id, "soft-deleted product");
        Ok(())
    }

    /// Clear `deleted_at`. Fails with 409 when the slug or SKU has been
    /// retaken by a live product in the meantime.
    pub async fn restore(&self, id: Uuid) -> Result<Product, ApiError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;

        if product.deleted_at.is_none() {
            return Ok(product);
        }

        self.ensure_sku_free(&product.sku, Some(id)).await?;
        self.ensure_slug_free(&product.slug, Some(id)).await?;

        let restored = sqlx::query_as::<_, Product>(
            "UPDATE products SET deleted_at = NULL, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(product_id = %id, "restored product");
        Ok(restored)
    }

    async fn assemble_detail(&self, product: Product) -> Result<ProductDetail, ApiError> {
        let inventory =
            sqlx::query_as::<_, Inventory>("SELECT * FROM inventory WHERE product_id = $1")
                .bind(product.id)
                .fetch_optional(&self.pool)
                .await?;

        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT * FROM product_images WHERE product_id = $1 ORDER BY position ASC",
        )
        .bind(product.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductDetail {
            product,
            inventory,
            images,
        })
    }

    async fn ensure_sku_free(&self, sku: &str, exclude: Option<Uuid>) -> Result<(), ApiError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(sku)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        if taken {
            return Err(ApiError::conflict_code("SKU_TAKEN", "SKU is already in use"));
        }
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &str, exclude: Option<Uuid>) -> Result<(), ApiError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        if taken {
            return Err(ApiError::conflict_code(
                "SLUG_TAKEN",
                "Slug is already in use",
            ));
        }
        Ok(())
    }

    async fn ensure_live_category(&self, category_id: Uuid) -> Result<(), ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(field_error("category_id", "category does not exist"));
        }
        Ok(())
    }
}

/// Price rules that `validator` cannot express on `Decimal` fields
fn check_prices(price: Decimal, compare_at: Option<Decimal>) -> Result<(), ApiError> {
    if price <= Decimal::ZERO {
        return Err(field_error("price", "price must be greater than zero"));
    }
    if let Some(compare_at) = compare_at {
        if compare_at <= price {
            return Err(ApiError::unprocessable(
                "compare_at_price must be greater than price",
            ));
        }
    }
    Ok(())
}

/// A unique-index violation on insert/update means a concurrent writer won
/// the slug or SKU between our pre-check and the statement.
fn map_product_unique_violation(constraint: Option<&str>) -> ApiError {
    match constraint {
        Some(name) if name.contains("sku") => {
            ApiError::conflict_code("SKU_TAKEN", "SKU is already in use")
        }
        _ => ApiError::conflict_code("SLUG_TAKEN", "Slug is already in use"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(check_prices(dec("0"), None).is_err());
        assert!(check_prices(dec("-1"), None).is_err());
        assert!(check_prices(dec("0.01"), None).is_ok());
    }

    #[test]
    fn test_compare_at_must_exceed_price() {
        let err = check_prices(dec("10.00"), Some(dec("10.00"))).unwrap_err();
        assert_eq!(err.status_code(), 422);

        assert!(check_prices(dec("10.00"), Some(dec("12.50"))).is_ok());
    }

    #[test]
    fn test_unique_violation_mapping() {
        let err = map_product_unique_violation(Some("products_sku_live_idx"));
        assert_eq!(err.error_code(), "SKU_TAKEN");

        let err = map_product_unique_violation(Some("products_slug_live_idx"));
        assert_eq!(err.error_code(), "SLUG_TAKEN");
    }
}
