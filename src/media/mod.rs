// Image intake pipeline: signature sniffing and pluggable object storage.
pub mod sniff;
pub mod storage;

pub use sniff::{sniff_image, ImageFormat};
pub use storage::{content_key, storage_from_config, LocalMediaStorage, MediaStorage, RemoteMediaStorage};
