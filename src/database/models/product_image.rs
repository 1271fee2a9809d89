use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub url: String,
    pub alt_text: Option<String>,
    pub content_type: String,
    pub byte_size: i64,
    pub position: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `PUT .../images/reorder`. Must list every image id of the product
/// exactly once.
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderImagesRequest {
    #[validate(length(min = 1, message = "image_ids must not be empty"))]
    pub image_ids: Vec<Uuid>,
}
