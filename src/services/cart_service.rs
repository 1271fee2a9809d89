use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::field_error;
use crate::database::manager::DatabaseManager;
use crate::database::models::cart::{Cart, CartItemDetail, CartView};
use crate::database::models::product::ProductStatus;
use crate::error::ApiError;

/// Hard ceiling per cart line, matching the request validators
const MAX_LINE_QUANTITY: i32 = 999;

pub struct CartService {
    pool: PgPool,
}

impl CartService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// The user's cart, created lazily on first touch
    async fn ensure_cart(&self, user_id: Uuid) -> Result<Cart, ApiError> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = carts.updated_at
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(cart)
    }

    /// Cart with its lines joined against current product state. Lines whose
    /// product has been soft-deleted are hidden.
    pub async fn view(&self, user_id: Uuid) -> Result<CartView, ApiError> {
        let cart = self.ensure_cart(user_id).await?;
        let items = self.items(cart.id).await?;

        let subtotal: Decimal = items.iter().map(|item| item.line_total()).sum();
        let item_count: i64 = items.iter().map(|item| i64::from(item.quantity)).sum();

        Ok(CartView {
            id: cart.id,
            items,
            subtotal,
            item_count,
        })
    }

    /// Add a product, incrementing the existing line if there is one. The
    /// combined quantity must fit the available stock.
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, ApiError> {
        let cart = self.ensure_cart(user_id).await?;
        let (name, available) = self.sellable_product(product_id).await?;

        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM cart_items WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart.id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        let new_quantity = existing.unwrap_or(0) + quantity;
        if new_quantity > MAX_LINE_QUANTITY {
            return Err(field_error(
                "quantity",
                "a cart line is limited to 999 units",
            ));
        }
        if new_quantity > available {
            return Err(insufficient_stock(&name, available));
        }

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = $3, updated_at = now()
            "#,
        )
        .bind(cart.id)
        .bind(product_id)
        .bind(new_quantity)
        .execute(&self.pool)
        .await?;

        self.view(user_id).await
    }

    /// Set a line's quantity; zero removes the line
    pub async fn update_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, ApiError> {
        let cart = self.ensure_cart(user_id).await?;

        if quantity == 0 {
            self.delete_line(cart.id, product_id).await?;
            return self.view(user_id).await;
        }

        let (name, available) = self.sellable_product(product_id).await?;
        if quantity > available {
            return Err(insufficient_stock(&name, available));
        }

        let result = sqlx::query(
            "UPDATE cart_items SET quantity = $1, updated_at = now() WHERE cart_id = $2 AND product_id = $3",
        )
        .bind(quantity)
        .bind(cart.id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Cart item not found"));
        }

        self.view(user_id).await
    }

    pub async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ApiError> {
        let cart = self.ensure_cart(user_id).await?;
        self.delete_line(cart.id, product_id).await
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<(), ApiError> {
        let cart = self.ensure_cart(user_id).await?;
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn items(&self, cart_id: Uuid) -> Result<Vec<CartItemDetail>, ApiError> {
        let items = sqlx::query_as::<_, CartItemDetail>(
            r#"
            SELECT ci.id, ci.product_id, ci.quantity,
                   p.name, p.slug, p.price AS unit_price, p.status,
                   COALESCE(i.quantity, 0) AS available,
                   pi.url AS primary_image_url
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            LEFT JOIN inventory i ON i.product_id = p.id
            LEFT JOIN product_images pi ON pi.product_id = p.id AND pi.is_primary
            WHERE ci.cart_id = $1 AND p.deleted_at IS NULL
            ORDER BY ci.created_at ASC
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn delete_line(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), ApiError> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Cart item not found"));
        }
        Ok(())
    }

    /// Storefront visibility plus stock: the product must be live and active
    async fn sellable_product(&self, product_id: Uuid) -> Result<(String, i32), ApiError> {
        let row = sqlx::query_as::<_, (String, ProductStatus, i32)>(
            r#"
            SELECT p.name, p.status, COALESCE(i.quantity, 0)
            FROM products p
            LEFT JOIN inventory i ON i.product_id = p.id
            WHERE p.id = $1 AND p.deleted_at IS NULL
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((name, ProductStatus::Active, available)) => Ok((name, available)),
            _ => Err(ApiError::not_found("Product not found")),
        }
    }
}

fn insufficient_stock(name: &str, available: i32) -> ApiError {
    ApiError::unprocessable_code(
        "INSUFFICIENT_STOCK",
        format!("Only {} of {} in stock", available, name),
    )
}
