// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Catalog, inventory, order and user administration under /api/admin/*.
// The route layer stacks `require_admin_middleware` on top of the JWT
// middleware, so handlers here can assume an admin `AuthUser`.

pub mod admin;
