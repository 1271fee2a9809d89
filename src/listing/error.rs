use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Invalid sort column: {0}")]
    InvalidSort(String),

    #[error("Invalid sort order: {0}")]
    InvalidOrder(String),

    #[error("Invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("Invalid price range: {0}")]
    InvalidPriceRange(String),
}

impl From<ListingError> for crate::error::ApiError {
    fn from(err: ListingError) -> Self {
        crate::error::ApiError::bad_request(err.to_string())
    }
}
