use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::ListingError;
use super::page::Page;
use super::params::{ParamBinder, SqlParam};
use crate::database::models::product::ProductStatus;

/// Raw query-string parameters for product listings. Everything is optional;
/// `build` resolves defaults and rejects values outside the whitelist.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub q: Option<String>,
    pub include_deleted: Option<bool>,
}

/// Storefront listings only ever see live, active products; the admin scope
/// can filter by status and opt into soft-deleted rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListScope {
    Storefront,
    Admin,
}

/// Compiled SQL fragments. The caller supplies the SELECT and joins; the
/// fragments reference the products table through the `p` alias.
#[derive(Debug)]
pub struct ProductListSql {
    pub where_sql: String,
    pub order_sql: String,
    pub limit_sql: String,
    pub params: Vec<SqlParam>,
    pub page: Page,
}

impl ProductListQuery {
    pub fn build(&self, scope: ListScope) -> Result<ProductListSql, ListingError> {
        let mut binder = ParamBinder::new();
        let mut conditions: Vec<String> = vec![];

        match scope {
            ListScope::Storefront => {
                conditions.push("p.\"deleted_at\" IS NULL".to_string());
                conditions.push("p.\"status\" = 'active'".to_string());
            }
            ListScope::Admin => {
                if !self.include_deleted.unwrap_or(false) {
                    conditions.push("p.\"deleted_at\" IS NULL".to_string());
                }
                if let Some(status) = &self.status {
                    if ProductStatus::parse(status).is_none() {
                        return Err(ListingError::InvalidStatus(status.clone()));
                    }
                    let placeholder = binder.push(SqlParam::Str(status.clone()));
                    conditions.push(format!("p.\"status\" = {}::product_status", placeholder));
                }
            }
        }

        if let Some(category) = &self.category {
            let placeholder = binder.push(SqlParam::Str(category.clone()));
            conditions.push(format!(
                "p.\"category_id\" = (SELECT c.id FROM categories c WHERE c.slug = {} AND c.\"deleted_at\" IS NULL)",
                placeholder
            ));
        }

        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) if min > max => {
                return Err(ListingError::InvalidPriceRange(format!(
                    "min_price {} exceeds max_price {}",
                    min, max
                )));
            }
            _ => {}
        }
        if let Some(min) = self.min_price {
            if min.is_sign_negative() {
                return Err(ListingError::InvalidPriceRange(
                    "min_price must not be negative".to_string(),
                ));
            }
            let placeholder = binder.push(SqlParam::Dec(min));
            conditions.push(format!("p.\"price\" >= {}", placeholder));
        }
        if let Some(max) = self.max_price {
            if max.is_sign_negative() {
                return Err(ListingError::InvalidPriceRange(
                    "max_price must not be negative".to_string(),
                ));
            }
            let placeholder = binder.push(SqlParam::Dec(max));
            conditions.push(format!("p.\"price\" <= {}", placeholder));
        }

        if let Some(q) = self.q.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = format!("%{}%", escape_like(q.trim()));
            let placeholder = binder.push(SqlParam::Str(pattern));
            conditions.push(format!(
                "(p.\"name\" ILIKE {ph} OR p.\"sku\" ILIKE {ph} OR p.\"description\" ILIKE {ph})",
                ph = placeholder
            ));
        }

        let where_sql = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };

        let order_sql = build_order(self.sort.as_deref(), self.order.as_deref())?;
        let page = Page::resolve(self.page, self.per_page);

        Ok(ProductListSql {
            where_sql,
            order_sql,
            limit_sql: page.limit_sql(),
            params: binder.into_values(),
            page,
        })
    }
}

fn build_order(sort: Option<&str>, order: Option<&str>) -> Result<String, ListingError> {
    let column = match sort.unwrap_or("created_at") {
        "created_at" => "p.\"created_at\"",
        "updated_at" => "p.\"updated_at\"",
        "name" => "p.\"name\"",
        "price" => "p.\"price\"",
        other => return Err(ListingError::InvalidSort(other.to_string())),
    };

    let direction = match order.unwrap_or("desc").to_ascii_lowercase().as_str() {
        "asc" => "ASC",
        "desc" => "DESC",
        other => return Err(ListingError::InvalidOrder(other.to_string())),
    };

    Ok(format!("{} {}", column, direction))
}

/// Escape LIKE metacharacters so user search terms match literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storefront_defaults() {
        let query = ProductListQuery::default();
        let sql = query.build(ListScope::Storefront).unwrap();

        assert_eq!(
            sql.where_sql,
            "p.\"deleted_at\" IS NULL AND p.\"status\" = 'active'"
        );
        assert_eq!(sql.order_sql, "p.\"created_at\" DESC");
        assert_eq!(sql.limit_sql, "LIMIT 20 OFFSET 0");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn test_storefront_ignores_status_param() {
        let query = ProductListQuery {
            status: Some("draft".to_string()),
            include_deleted: Some(true),
            ..Default::default()
        };
        let sql = query.build(ListScope::Storefront).unwrap();
        assert!(sql.where_sql.contains("p.\"status\" = 'active'"));
        assert!(sql.where_sql.contains("p.\"deleted_at\" IS NULL"));
    }

    #[test]
    fn test_admin_include_deleted_drops_filter() {
        let query = ProductListQuery {
            include_deleted: Some(true),
            ..Default::default()
        };
        let sql = query.build(ListScope::Admin).unwrap();
        assert_eq!(sql.where_sql, "1=1");
    }

    #[test]
    fn test_admin_status_filter_is_parameterized() {
        let query = ProductListQuery {
            status: Some("draft".to_string()),
            ..Default::default()
        };
        let sql = query.build(ListScope::Admin).unwrap();
        assert!(sql.where_sql.contains("p.\"status\" = $1::product_status"));
        assert_eq!(sql.params, vec![SqlParam::Str("draft".to_string())]);
    }

    #[test]
    fn test_admin_rejects_unknown_status() {
        let query = ProductListQuery {
            status: Some("retired".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.build(ListScope::Admin),
            Err(ListingError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_search_pattern_escapes_metacharacters() {
        let query = ProductListQuery {
            q: Some("50%_off".to_string()),
            ..Default::default()
        };
        let sql = query.build(ListScope::Storefront).unwrap();
        assert_eq!(
            sql.params,
            vec![SqlParam::Str("%50\\%\\_off%".to_string())]
        );
        // The same placeholder is reused across name, sku and description
        assert_eq!(sql.where_sql.matches("$1").count(), 3);
    }

    #[test]
    fn test_category_filter_uses_subquery() {
        let query = ProductListQuery {
            category: Some("hand-tools".to_string()),
            ..Default::default()
        };
        let sql = query.build(ListScope::Storefront).unwrap();
        assert!(sql.where_sql.contains("c.slug = $1"));
        assert_eq!(sql.params, vec![SqlParam::Str("hand-tools".to_string())]);
    }

    #[test]
    fn test_price_range_order_enforced() {
        let query = ProductListQuery {
            min_price: Some("30".parse().unwrap()),
            max_price: Some("10".parse().unwrap()),
            ..Default::default()
        };
        assert!(matches!(
            query.build(ListScope::Storefront),
            Err(ListingError::InvalidPriceRange(_))
        ));
    }

    #[test]
    fn test_price_bounds_bind_in_order() {
        let query = ProductListQuery {
            min_price: Some("10.00".parse().unwrap()),
            max_price: Some("25.50".parse().unwrap()),
            ..Default::default()
        };
        let sql = query.build(ListScope::Storefront).unwrap();
        assert!(sql.where_sql.contains("p.\"price\" >= $1"));
        assert!(sql.where_sql.contains("p.\"price\" <= $2"));
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn test_sort_whitelist() {
        let query = ProductListQuery {
            sort: Some("price".to_string()),
            order: Some("asc".to_string()),
            ..Default::default()
        };
        let sql = query.build(ListScope::Storefront).unwrap();
        assert_eq!(sql.order_sql, "p.\"price\" ASC");

        let bad = ProductListQuery {
            sort: Some("password_hash".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad.build(ListScope::Storefront),
            Err(ListingError::InvalidSort(_))
        ));
    }
}
