// handlers/elevated/admin/mod.rs - Admin API surface
//
// Product lifecycle gets a module per operation; the smaller resources keep
// their handlers together in one file each.

pub mod categories;
pub mod images;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod users;
