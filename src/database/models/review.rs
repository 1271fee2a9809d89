use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review joined with the reviewer's display name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub author_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 200, message = "title is limited to 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "body is limited to 5000 characters"))]
    pub body: Option<String>,
}
