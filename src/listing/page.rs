use serde::Deserialize;

use crate::config;

/// Bare `page`/`per_page` query string, for lists with no further filters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn resolve(&self) -> Page {
        Page::resolve(self.page, self.per_page)
    }
}

/// Resolved pagination window. Out-of-range requests clamp rather than error:
/// page floors at 1, per_page is capped by `catalog.max_page_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn resolve(page: Option<i64>, per_page: Option<i64>) -> Self {
        let catalog = &config::config().catalog;

        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(catalog.default_page_size)
            .clamp(1, catalog.max_page_size);

        Self { page, per_page }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit_sql(&self) -> String {
        format!("LIMIT {} OFFSET {}", self.per_page, self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let page = Page::resolve(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_per_page_capped_at_max() {
        let page = Page::resolve(Some(2), Some(100_000));
        assert_eq!(page.per_page, 100);
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn test_nonsense_values_clamped() {
        let page = Page::resolve(Some(-3), Some(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);
    }

    #[test]
    fn test_limit_sql_shape() {
        let page = Page::resolve(Some(3), Some(25));
        assert_eq!(page.limit_sql(), "LIMIT 25 OFFSET 50");
    }
}
