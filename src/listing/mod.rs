// List-endpoint query machinery: pagination, sorting and filtering compiled
// to parameterized SQL fragments.
pub mod error;
pub mod page;
pub mod params;
pub mod products;

pub use error::ListingError;
pub use page::{Page, PageQuery};
pub use params::{bind_param_query, bind_param_query_as, bind_param_query_scalar, ParamBinder, SqlParam};
pub use products::{ListScope, ProductListQuery, ProductListSql};
