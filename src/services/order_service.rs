use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::order::{
    CheckoutRequest, Order, OrderDetail, OrderItem, OrderStatus, Payment,
};
use crate::database::models::product::ProductStatus;
use crate::error::ApiError;
use crate::listing::{bind_param_query_as, bind_param_query_scalar, Page, ParamBinder, SqlParam};

/// What checkout hands back: the order (with its snapshot lines) and the
/// payment record. `created` distinguishes a fresh order (201) from an
/// idempotent replay (200).
#[derive(Debug, Serialize)]
pub struct CheckoutResult {
    pub order: OrderDetail,
    pub payment: Payment,
    #[serde(skip)]
    pub created: bool,
}

/// Admin order listing filters
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One cart line as seen at checkout, joined and locked with its stock row
#[derive(Debug, FromRow)]
struct CheckoutLine {
    product_id: Uuid,
    quantity: i32,
    name: String,
    sku: String,
    price: Decimal,
    status: ProductStatus,
    deleted: bool,
    available: i32,
}

pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Turn the cart into a paid order in one transaction. Inventory rows are
    /// locked in product-id order so concurrent checkouts cannot deadlock;
    /// nothing is decremented unless every line is satisfiable. Replaying an
    /// idempotency key returns the original order untouched.
    pub async fn checkout(
        &self,
        user_id: Uuid,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResult, ApiError> {
        if let Some(replay) = self
            .find_by_idempotency_key(user_id, &request.idempotency_key)
            .await?
        {
            return Ok(replay);
        }

        if let Some(address_id) = request.address_id {
            let owned = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM addresses WHERE id = $1 AND user_id = $2)",
            )
            .bind(address_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            if !owned {
                return Err(ApiError::not_found("Address not found"));
            }
        }

        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, CheckoutLine>(
            r#"
            SELECT ci.product_id, ci.quantity, p.name, p.sku, p.price, p.status,
                   (p.deleted_at IS NOT NULL) AS deleted,
                   i.quantity AS available
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            JOIN products p ON p.id = ci.product_id
            JOIN inventory i ON i.product_id = ci.product_id
            WHERE c.user_id = $1
            ORDER BY ci.product_id
            FOR UPDATE OF i
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(ApiError::unprocessable_code("EMPTY_CART", "Cart is empty"));
        }

        for line in &lines {
            if line.deleted || line.status != ProductStatus::Active {
                return Err(ApiError::unprocessable(format!(
                    "{} is no longer available",
                    line.name
                )));
            }
            if line.available < line.quantity {
                return Err(ApiError::unprocessable_code(
                    "INSUFFICIENT_STOCK",
                    format!("Only {} of {} in stock", line.available, line.name),
                ));
            }
        }

        for line in &lines {
            sqlx::query(
                "UPDATE inventory SET quantity = quantity - $1, updated_at = now() WHERE product_id = $2",
            )
            .bind(line.quantity)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await?;
        }

        let subtotal: Decimal = lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        let total = subtotal;

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, status, subtotal, total, shipping_address_id)
            VALUES ($1, 'pending', $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(subtotal)
        .bind(total)
        .bind(request.address_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, name, sku, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(&line.sku)
            .bind(line.price)
            .bind(line.quantity)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        let payment_insert = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (order_id, amount, status, idempotency_key, provider)
            VALUES ($1, $2, 'succeeded', $3, 'manual')
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(total)
        .bind(&request.idempotency_key)
        .fetch_one(&mut *tx)
        .await;

        let payment = match payment_insert {
            Ok(payment) => payment,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // A concurrent request with the same key won; hand back its order
                tx.rollback().await?;
                return self
                    .find_by_idempotency_key(user_id, &request.idempotency_key)
                    .await?
                    .ok_or_else(|| {
                        ApiError::conflict("Idempotency key is already in use")
                    });
            }
            Err(other) => return Err(other.into()),
        };

        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = 'paid', updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(order.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM cart_items WHERE cart_id = (SELECT id FROM carts WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order.id, user_id = %user_id, total = %total, "checkout completed");

        Ok(CheckoutResult {
            order: OrderDetail {
                order,
                items,
                payment: None,
            },
            payment,
            created: true,
        })
    }

    /// Own orders, newest first
    pub async fn list_mine(&self, user_id: Uuid, page: Page) -> Result<(Vec<Order>, i64), ApiError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC {}",
            page.limit_sql()
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok((orders, total))
    }

    /// Own order with items and payment. Another user's order is a 404, not
    /// a 403, so order ids cannot be probed.
    pub async fn get_mine(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDetail, ApiError> {
        let order =
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
                .bind(order_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ApiError::not_found("Order not found"))?;

        self.detail(order).await
    }

    /// Customer cancellation, allowed while the order is pending or paid
    pub async fn cancel_mine(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDetail, ApiError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

        let order = self.transition(&mut tx, order, OrderStatus::Cancelled).await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, "order cancelled");
        self.detail(order).await
    }

    /// Admin listing across all users, filterable by status and customer
    pub async fn admin_list(&self, query: &OrderListQuery) -> Result<(Vec<Order>, i64, Page), ApiError> {
        let mut binder = ParamBinder::new();
        let mut conditions: Vec<String> = vec![];

        if let Some(status) = &query.status {
            let parsed = OrderStatus::parse(status)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown order status: {}", status)))?;
            let ph = binder.push(SqlParam::Str(parsed.as_str().to_string()));
            conditions.push(format!("o.status = {}::order_status", ph));
        }
        if let Some(user_id) = query.user_id {
            let ph = binder.push(SqlParam::Uuid(user_id));
            conditions.push(format!("o.user_id = {}", ph));
        }

        let where_sql = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        let page = Page::resolve(query.page, query.per_page);
        let params = binder.into_values();

        let count_sql = format!("SELECT COUNT(*) FROM orders o WHERE {}", where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in &params {
            count_query = bind_param_query_scalar(count_query, param);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT o.* FROM orders o WHERE {} ORDER BY o.created_at DESC {}",
            where_sql,
            page.limit_sql()
        );
        let mut list_query = sqlx::query_as::<_, Order>(&list_sql);
        for param in &params {
            list_query = bind_param_query_as(list_query, param);
        }
        let orders = list_query.fetch_all(&self.pool).await?;

        Ok((orders, total, page))
    }

    pub async fn admin_get(&self, order_id: Uuid) -> Result<OrderDetail, ApiError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Order not found"))?;

        self.detail(order).await
    }

    /// Admin lifecycle move; cancellation restocks inside the transaction
    pub async fn admin_set_status(
        &self,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderDetail, ApiError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("Order not found"))?;

        let order = self.transition(&mut tx, order, next).await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, status = order.status.as_str(), "order status changed");
        self.detail(order).await
    }

    /// Validate and apply a status move on an already-locked order row
    async fn transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: Order,
        next: OrderStatus,
    ) -> Result<Order, ApiError> {
        if !order.status.can_transition_to(next) {
            return Err(ApiError::unprocessable_code(
                "INVALID_STATUS_TRANSITION",
                format!(
                    "Cannot move an order from {} to {}",
                    order.status.as_str(),
                    next.as_str()
                ),
            ));
        }

        if next.restocks() {
            // Lock stock rows in product order, same as checkout does
            sqlx::query(
                r#"
                SELECT i.product_id FROM inventory i
                JOIN order_items oi ON oi.product_id = i.product_id
                WHERE oi.order_id = $1
                ORDER BY i.product_id
                FOR UPDATE OF i
                "#,
            )
            .bind(order.id)
            .execute(&mut **tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE inventory i
                SET quantity = i.quantity + oi.quantity, updated_at = now()
                FROM order_items oi
                WHERE oi.order_id = $1 AND i.product_id = oi.product_id
                "#,
            )
            .bind(order.id)
            .execute(&mut **tx)
            .await?;
        }

        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(next)
        .bind(order.id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(updated)
    }

    async fn find_by_idempotency_key(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> Result<Option<CheckoutResult>, ApiError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.* FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE p.idempotency_key = $1 AND o.user_id = $2
            "#,
        )
        .bind(key)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(payment) = payment else {
            return Ok(None);
        };

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(payment.order_id)
            .fetch_one(&self.pool)
            .await?;
        let items = self.items(order.id).await?;

        Ok(Some(CheckoutResult {
            order: OrderDetail {
                order,
                items,
                payment: None,
            },
            payment,
            created: false,
        }))
    }

    async fn detail(&self, order: Order) -> Result<OrderDetail, ApiError> {
        let items = self.items(order.id).await?;
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1")
            .bind(order.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(OrderDetail {
            order,
            items,
            payment,
        })
    }

    async fn items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, ApiError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY name ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
