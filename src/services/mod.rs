// Business logic layer. Each service owns the SQL for one resource and
// returns ApiError so handlers stay thin.
pub mod address_service;
pub mod cart_service;
pub mod category_service;
pub mod inventory_service;
pub mod media_service;
pub mod order_service;
pub mod product_service;
pub mod review_service;
pub mod user_service;

pub use address_service::AddressService;
pub use cart_service::CartService;
pub use category_service::CategoryService;
pub use inventory_service::InventoryService;
pub use media_service::MediaService;
pub use order_service::{CheckoutResult, OrderService};
pub use product_service::ProductService;
pub use review_service::ReviewService;
pub use user_service::UserService;

/// Single-field 400 for business rules `validator` cannot express
pub(crate) fn field_error(field: &str, message: &str) -> crate::error::ApiError {
    let mut fields = std::collections::HashMap::new();
    fields.insert(field.to_string(), vec![message.to_string()]);
    crate::error::ApiError::validation("Request validation failed", fields)
}

/// URL-safe slug from a display name: lowercase ASCII alphanumerics with
/// single dashes, no leading or trailing dash. May come out empty for names
/// with no alphanumeric characters; callers treat that as invalid input.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Garden Trowel"), "garden-trowel");
        assert_eq!(slugify("Heavy-Duty  Shears (Pro)"), "heavy-duty-shears-pro");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  Rake  "), "rake");
        assert_eq!(slugify("--x--"), "x");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("a   &   b"), "a-b");
    }

    #[test]
    fn test_slugify_can_be_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }
}
