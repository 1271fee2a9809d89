// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus the read-only storefront: product listings,
// product details, categories and reviews.

pub mod auth;
pub mod categories;
pub mod products;
pub mod status;
