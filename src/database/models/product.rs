use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::inventory::Inventory;
use crate::database::models::product_image::ProductImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Active,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ProductStatus::Draft),
            "active" => Some(ProductStatus::Active),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub status: ProductStatus,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One row of a product listing: the product joined with its stock level and
/// primary image URL.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub quantity: Option<i32>,
    pub primary_image_url: Option<String>,
}

/// Full product payload for detail endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub inventory: Option<Inventory>,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 220, message = "slug must be 1-220 characters"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 64, message = "sku must be 1-64 characters"))]
    pub sku: String,
    #[validate(length(max = 5000, message = "description is limited to 5000 characters"))]
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub status: Option<ProductStatus>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0, message = "initial_quantity must be zero or more"))]
    pub initial_quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 220, message = "slug must be 1-220 characters"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 64, message = "sku must be 1-64 characters"))]
    pub sku: Option<String>,
    #[validate(length(max = 5000, message = "description is limited to 5000 characters"))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    // Double Option: absent = leave alone, null = clear
    #[serde(default, with = "crate::database::models::double_option")]
    pub compare_at_price: Option<Option<Decimal>>,
    pub status: Option<ProductStatus>,
    #[serde(default, with = "crate::database::models::double_option")]
    pub category_id: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            ProductStatus::Draft,
            ProductStatus::Active,
            ProductStatus::Archived,
        ] {
            assert_eq!(ProductStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProductStatus::parse("retired"), None);
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let absent: UpdateProductRequest = serde_json::from_str(r#"{"name": "Pruner"}"#).unwrap();
        assert!(absent.category_id.is_none());

        let cleared: UpdateProductRequest =
            serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));
    }
}
