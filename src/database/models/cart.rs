use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::product::ProductStatus;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cart line joined with the current product state, as returned to clients
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItemDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub slug: String,
    pub unit_price: Decimal,
    pub status: ProductStatus,
    pub available: i32,
    pub primary_image_url: Option<String>,
}

impl CartItemDetail {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Cart payload: lines plus aggregate totals. The totals are not serialized
/// with the cart body; handlers surface them under `meta.totals`.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: Uuid,
    pub items: Vec<CartItemDetail>,
    #[serde(skip_serializing)]
    pub subtotal: Decimal,
    #[serde(skip_serializing)]
    pub item_count: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 999, message = "quantity must be between 1 and 999"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 0, max = 999, message = "quantity must be between 0 and 999"))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_multiplies() {
        let line = CartItemDetail {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 3,
            name: "Secateurs".to_string(),
            slug: "secateurs".to_string(),
            unit_price: "12.50".parse().unwrap(),
            status: ProductStatus::Active,
            available: 10,
            primary_image_url: None,
        };
        assert_eq!(line.line_total(), "37.50".parse::<Decimal>().unwrap());
    }
}
