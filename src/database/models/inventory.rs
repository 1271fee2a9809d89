use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Inventory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub low_stock_threshold: i32,
    pub updated_at: DateTime<Utc>,
}

/// Row of the low-stock report: inventory joined with product identity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LowStockItem {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub low_stock_threshold: i32,
}

/// Admin stock adjustment. Exactly one of `quantity` (absolute) or `delta`
/// (relative) must be given.
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustInventoryRequest {
    #[validate(range(min = 0, message = "quantity must be zero or more"))]
    pub quantity: Option<i32>,
    pub delta: Option<i32>,
    #[validate(range(min = 0, message = "low_stock_threshold must be zero or more"))]
    pub low_stock_threshold: Option<i32>,
}
