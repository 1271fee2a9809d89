use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::product_image::ProductImage;
use crate::error::ApiError;
use crate::media::{content_key, sniff_image, storage_from_config, MediaStorage};

pub struct MediaService {
    pool: PgPool,
    storage: Arc<dyn MediaStorage>,
}

impl MediaService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        let storage = storage_from_config()?;
        Ok(Self { pool, storage })
    }

    /// Upload pipeline: live product, size cap, magic-number sniff,
    /// per-product cap, store, insert. The declared content type is ignored;
    /// the sniffed format decides.
    pub async fn upload(
        &self,
        product_id: Uuid,
        bytes: &[u8],
        alt_text: Option<String>,
    ) -> Result<ProductImage, ApiError> {
        let live = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        if !live {
            return Err(ApiError::not_found("Product not found"));
        }

        if bytes.is_empty() {
            return Err(ApiError::bad_request("file part is empty"));
        }
        let max_bytes = config::config().media.max_upload_bytes;
        if bytes.len() > max_bytes {
            return Err(ApiError::payload_too_large(format!(
                "Image exceeds the {} byte upload limit",
                max_bytes
            )));
        }

        let format = sniff_image(bytes).ok_or_else(|| {
            ApiError::unsupported_media_type(
                "File is not a recognized image format (jpeg, png, gif, webp)",
            )
        })?;

        let cap = config::config().catalog.max_images_per_product;
        if self.image_count(product_id).await? >= cap {
            return Err(image_limit_error(cap));
        }

        // Store before opening the transaction so no locks are held during
        // backend IO. Keys are content hashes, so a stray object from a lost
        // race is reused by the retry.
        let key = content_key(bytes, format.extension());
        let url = self.storage.put(&key, bytes, format.content_type()).await?;

        let mut tx = self.pool.begin().await?;

        // The product row lock serializes image writes per product
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM products WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(ApiError::not_found("Product not found"));
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_images WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;
        if count >= cap {
            return Err(image_limit_error(cap));
        }

        let image = sqlx::query_as::<_, ProductImage>(
            r#"
            INSERT INTO product_images
                (product_id, storage_key, url, alt_text, content_type, byte_size, position, is_primary)
            VALUES
                ($1, $2, $3, $4, $5, $6,
                 (SELECT COALESCE(MAX(position) + 1, 0) FROM product_images WHERE product_id = $1),
                 $7)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(&key)
        .bind(&url)
        .bind(&alt_text)
        .bind(format.content_type())
        .bind(bytes.len() as i64)
        .bind(count == 0)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(product_id = %product_id, image_id = %image.id, "uploaded product image");
        Ok(image)
    }

    /// Remove an image. When the primary goes, the lowest-positioned survivor
    /// is promoted in the same transaction. The stored object is deleted only
    /// once no other row shares its content-hash key.
    pub async fn delete(&self, product_id: Uuid, image_id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        self.lock_product(&mut tx, product_id).await?;

        let image = sqlx::query_as::<_, ProductImage>(
            "SELECT * FROM product_images WHERE id = $1 AND product_id = $2",
        )
        .bind(image_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

        sqlx::query("DELETE FROM product_images WHERE id = $1")
            .bind(image_id)
            .execute(&mut *tx)
            .await?;

        if image.is_primary {
            sqlx::query(
                r#"
                UPDATE product_images SET is_primary = true
                WHERE id = (SELECT id FROM product_images
                            WHERE product_id = $1
                            ORDER BY position ASC LIMIT 1)
                "#,
            )
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        let still_referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_images WHERE storage_key = $1)",
        )
        .bind(&image.storage_key)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if !still_referenced {
            if let Err(e) = self.storage.delete(&image.storage_key).await {
                tracing::warn!(key = %image.storage_key, "failed to delete stored object: {}", e);
            }
        }

        tracing::info!(product_id = %product_id, image_id = %image_id, "deleted product image");
        Ok(())
    }

    /// Rewrite display positions. `image_ids` must be a permutation of the
    /// product's current image ids.
    pub async fn reorder(
        &self,
        product_id: Uuid,
        image_ids: &[Uuid],
    ) -> Result<Vec<ProductImage>, ApiError> {
        let mut tx = self.pool.begin().await?;

        self.lock_product(&mut tx, product_id).await?;

        let current: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM product_images WHERE product_id = $1")
                .bind(product_id)
                .fetch_all(&mut *tx)
                .await?;

        let mut expected = current.clone();
        expected.sort();
        let mut given = image_ids.to_vec();
        given.sort();
        if expected != given {
            return Err(ApiError::bad_request(
                "image_ids must list every image of the product exactly once",
            ));
        }

        for (position, image_id) in image_ids.iter().enumerate() {
            sqlx::query("UPDATE product_images SET position = $1 WHERE id = $2")
                .bind(position as i32)
                .bind(image_id)
                .execute(&mut *tx)
                .await?;
        }

        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT * FROM product_images WHERE product_id = $1 ORDER BY position ASC",
        )
        .bind(product_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(images)
    }

    /// Move the primary flag: clear the old carrier, set the new one
    pub async fn set_primary(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<ProductImage, ApiError> {
        let mut tx = self.pool.begin().await?;

        self.lock_product(&mut tx, product_id).await?;

        let belongs = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_images WHERE id = $1 AND product_id = $2)",
        )
        .bind(image_id)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;
        if !belongs {
            return Err(ApiError::not_found("Image not found"));
        }

        sqlx::query("UPDATE product_images SET is_primary = false WHERE product_id = $1 AND is_primary")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let image = sqlx::query_as::<_, ProductImage>(
            "UPDATE product_images SET is_primary = true WHERE id = $1 RETURNING *",
        )
        .bind(image_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(image)
    }

    async fn image_count(&self, product_id: Uuid) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_images WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Image mutations take the product row lock first, in the same order as
    /// the upload path, so they cannot deadlock with each other.
    async fn lock_product(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: Uuid,
    ) -> Result<(), ApiError> {
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;
        if locked.is_none() {
            return Err(ApiError::not_found("Product not found"));
        }
        Ok(())
    }
}

fn image_limit_error(cap: i64) -> ApiError {
    ApiError::unprocessable_code(
        "IMAGE_LIMIT_REACHED",
        format!("Products are limited to {} images", cap),
    )
}
