// handlers/elevated/admin/products/mod.rs - Product lifecycle management

pub mod create;   // POST /api/admin/products
pub mod delete;   // DELETE /api/admin/products/:id
pub mod list;     // GET /api/admin/products
pub mod restore;  // POST /api/admin/products/:id/restore
pub mod show;     // GET /api/admin/products/:id
pub mod update;   // PUT /api/admin/products/:id

pub use create::product_create;
pub use delete::product_delete;
pub use list::product_list;
pub use restore::product_restore;
pub use show::product_show;
pub use update::product_update;
