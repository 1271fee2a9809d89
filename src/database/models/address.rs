use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    #[validate(length(max = 60, message = "label is limited to 60 characters"))]
    pub label: Option<String>,
    #[validate(length(min = 1, max = 200, message = "line1 must be 1-200 characters"))]
    pub line1: String,
    #[validate(length(max = 200, message = "line2 is limited to 200 characters"))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100, message = "city must be 1-100 characters"))]
    pub city: String,
    #[validate(length(max = 100, message = "region is limited to 100 characters"))]
    pub region: Option<String>,
    #[validate(length(min = 1, max = 20, message = "postal_code must be 1-20 characters"))]
    pub postal_code: String,
    #[validate(length(equal = 2, message = "country must be a two-letter ISO code"))]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAddressRequest {
    #[validate(length(max = 60, message = "label is limited to 60 characters"))]
    pub label: Option<String>,
    #[validate(length(min = 1, max = 200, message = "line1 must be 1-200 characters"))]
    pub line1: Option<String>,
    #[validate(length(max = 200, message = "line2 is limited to 200 characters"))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100, message = "city must be 1-100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "region is limited to 100 characters"))]
    pub region: Option<String>,
    #[validate(length(min = 1, max = 20, message = "postal_code must be 1-20 characters"))]
    pub postal_code: Option<String>,
    #[validate(length(equal = 2, message = "country must be a two-letter ISO code"))]
    pub country: Option<String>,
    pub is_default: Option<bool>,
}
