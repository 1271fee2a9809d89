pub mod address;
pub mod cart;
pub mod category;
pub mod inventory;
pub mod order;
pub mod product;
pub mod product_image;
pub mod review;
pub mod user;

/// Serde helper for PATCH-style fields where "absent" and "null" differ:
/// absent leaves the column alone, an explicit null clears it.
pub mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer).map(Some)
    }
}
