use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{self, MediaBackend};
use crate::error::ApiError;

/// Object storage seam for product media. Backends store immutable blobs
/// under content-hash keys and return the URL clients fetch them from.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, ApiError>;
    async fn delete(&self, key: &str) -> Result<(), ApiError>;
}

/// Derive the storage key from the content itself. Identical uploads share a
/// key, so re-uploading the same file is harmless.
pub fn content_key(bytes: &[u8], extension: &str) -> String {
    let digest = Sha256::digest(bytes);
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}/{}.{}", &hex[..2], &hex[2..], extension)
}

/// Pick the backend the config asks for
pub fn storage_from_config() -> Result<Arc<dyn MediaStorage>, ApiError> {
    let media = &config::config().media;
    match media.backend {
        MediaBackend::Local => Ok(Arc::new(LocalMediaStorage::new(
            &media.local_root,
            &media.public_base_url,
        ))),
        MediaBackend::Remote => {
            let endpoint = media.remote_endpoint.as_deref().ok_or_else(|| {
                ApiError::internal("MEDIA_REMOTE_ENDPOINT is required for the remote media backend")
            })?;
            Ok(Arc::new(RemoteMediaStorage::new(endpoint)))
        }
    }
}

/// Writes blobs under a local directory; the server exposes that directory
/// at `media.public_base_url`.
pub struct LocalMediaStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl AsRef<Path>, public_base_url: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<String, ApiError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), ApiError> {
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Pushes blobs to an HTTP object store (PUT/DELETE on `{endpoint}/{key}`)
pub struct RemoteMediaStorage {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteMediaStorage {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint, key)
    }
}

#[async_trait]
impl MediaStorage for RemoteMediaStorage {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, ApiError> {
        let url = self.object_url(key);
        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::error!(
                "media upload to {} returned status {}",
                url,
                response.status()
            );
            return Err(ApiError::bad_gateway("Media storage rejected the upload"));
        }

        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), ApiError> {
        let url = self.object_url(key);
        let response = self.client.delete(&url).send().await?;

        // A missing object is already deleted as far as we care
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            tracing::error!(
                "media delete of {} returned status {}",
                url,
                response.status()
            );
            return Err(ApiError::bad_gateway("Media storage rejected the delete"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_deterministic() {
        let a = content_key(b"same bytes", "png");
        let b = content_key(b"same bytes", "png");
        let c = content_key(b"other bytes", "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_content_key_shape() {
        let key = content_key(b"bytes", "jpg");
        // Sharded as "ab/rest-of-hash.ext"
        assert_eq!(key.split('/').count(), 2);
        assert!(key.ends_with(".jpg"));
        assert_eq!(key.split('/').next().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_local_storage_roundtrip() {
        let root = std::env::temp_dir().join(format!("orchard-media-{}", uuid::Uuid::new_v4()));
        let storage = LocalMediaStorage::new(&root, "/media");

        let key = content_key(b"fake image bytes", "png");
        let url = storage.put(&key, b"fake image bytes", "image/png").await.unwrap();
        assert_eq!(url, format!("/media/{}", key));
        assert!(root.join(&key).exists());

        storage.delete(&key).await.unwrap();
        assert!(!root.join(&key).exists());

        // Deleting again is a no-op rather than an error
        storage.delete(&key).await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
