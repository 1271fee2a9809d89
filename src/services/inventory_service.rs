use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::inventory::{AdjustInventoryRequest, Inventory, LowStockItem};
use crate::error::ApiError;

pub struct InventoryService {
    pool: PgPool,
}

impl InventoryService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Row-locked stock adjustment: `quantity` sets an absolute level,
    /// `delta` shifts the current one. The result may not go negative.
    pub async fn adjust(
        &self,
        product_id: Uuid,
        request: &AdjustInventoryRequest,
    ) -> Result<Inventory, ApiError> {
        if request.quantity.is_some() && request.delta.is_some() {
            return Err(ApiError::bad_request(
                "Provide either quantity or delta, not both",
            ));
        }
        if request.quantity.is_none()
            && request.delta.is_none()
            && request.low_stock_threshold.is_none()
        {
            return Err(ApiError::bad_request(
                "Provide quantity, delta, or low_stock_threshold",
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Inventory>(
            r#"
            SELECT i.* FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.product_id = $1 AND p.deleted_at IS NULL
            FOR UPDATE OF i
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

        let new_quantity = match (request.quantity, request.delta) {
            (Some(quantity), _) => quantity,
            (None, Some(delta)) => current.quantity + delta,
            (None, None) => current.quantity,
        };
        if new_quantity < 0 {
            return Err(ApiError::unprocessable(format!(
                "Stock cannot go below zero ({} on hand, adjustment would leave {})",
                current.quantity, new_quantity
            )));
        }

        let inventory = sqlx::query_as::<_, Inventory>(
            r#"
            UPDATE inventory
            SET quantity = $1,
                low_stock_threshold = COALESCE($2, low_stock_threshold),
                updated_at = now()
            WHERE product_id = $3
            RETURNING *
            "#,
        )
        .bind(new_quantity)
        .bind(request.low_stock_threshold)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(product_id = %product_id, quantity = inventory.quantity, "adjusted inventory");
        Ok(inventory)
    }

    /// Live products at or below their low-stock threshold, emptiest first
    pub async fn low_stock(&self) -> Result<Vec<LowStockItem>, ApiError> {
        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT p.id AS product_id, p.name, p.sku, i.quantity, i.low_stock_threshold
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.quantity <= i.low_stock_threshold AND p.deleted_at IS NULL
            ORDER BY i.quantity ASC, p.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
