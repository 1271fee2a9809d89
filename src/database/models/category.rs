use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Category plus its live product count, for detail responses
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// Nested rendering for `GET /api/categories?tree=true`
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 140, message = "slug must be 1-140 characters"))]
    pub slug: Option<String>,
    #[validate(length(max = 2000, message = "description is limited to 2000 characters"))]
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 140, message = "slug must be 1-140 characters"))]
    pub slug: Option<String>,
    #[validate(length(max = 2000, message = "description is limited to 2000 characters"))]
    pub description: Option<String>,
    // Double Option: absent = leave alone, null = clear the parent
    #[serde(default, with = "crate::database::models::double_option")]
    pub parent_id: Option<Option<Uuid>>,
}
