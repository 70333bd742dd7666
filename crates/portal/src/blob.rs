//! Blob storage for progress photos.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores files by slash-separated path and hands out download URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing blob.
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Public URL for a stored blob.
    async fn download_url(&self, path: &str) -> Result<String, BlobError>;

    /// Remove the blob at `path`. Removing a missing blob succeeds.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;
}

/// Storage path for an active program's progress photo.
pub fn photo_path(owner: &str, active_id: &str, filename: &str) -> Result<String, BlobError> {
    let path = format!("program_photos/{owner}/{active_id}/{filename}");
    validate_path(&path)?;
    Ok(path)
}

/// Reject empty, absolute, or traversing paths.
pub fn validate_path(path: &str) -> Result<(), BlobError> {
    let valid = !path.is_empty()
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(BlobError::InvalidPath(path.to_string()))
    }
}

/// Blobs on the local filesystem, served under a base URL.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        validate_path(path)?;
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        tracing::debug!("Stored blob {} ({} bytes)", path, bytes.len());
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, BlobError> {
        validate_path(path)?;
        if !tokio::fs::try_exists(self.root.join(path)).await? {
            return Err(BlobError::InvalidPath(format!("{path} does not exist")));
        }
        Ok(format!("{}/{}", self.base_url, path))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        validate_path(path)?;
        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => {
                tracing::debug!("Removed blob {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory blobs for tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes at `path`.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        validate_path(path)?;
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, BlobError> {
        if self.get(path).is_none() {
            return Err(BlobError::InvalidPath(format!("{path} does not exist")));
        }
        Ok(format!("memory://{path}"))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_path() {
        assert_eq!(
            photo_path("user-1", "active-1", "front.jpg").unwrap(),
            "program_photos/user-1/active-1/front.jpg"
        );
        assert!(photo_path("user-1", "active-1", "../escape.jpg").is_err());
        assert!(photo_path("user-1", "active-1", "").is_err());
        assert!(photo_path("user-1", "active-1", "a\\b.jpg").is_err());
    }

    #[tokio::test]
    async fn test_local_store_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:8790/blobs/");

        let path = "program_photos/user-1/active-1/front.jpg";
        assert!(store.download_url(path).await.is_err());

        store.upload(path, b"jpeg").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join(path)).unwrap(), b"jpeg");
        assert_eq!(
            store.download_url(path).await.unwrap(),
            "http://localhost:8790/blobs/program_photos/user-1/active-1/front.jpg"
        );

        store.delete(path).await.unwrap();
        assert!(!dir.path().join(path).exists());
        store.delete(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryBlobStore::new();
        store.upload("a/b.png", b"png").await.unwrap();
        assert_eq!(store.get("a/b.png").as_deref(), Some(&b"png"[..]));
        assert_eq!(store.download_url("a/b.png").await.unwrap(), "memory://a/b.png");
        assert!(store.upload("/abs.png", b"x").await.is_err());

        store.delete("a/b.png").await.unwrap();
        assert!(store.is_empty());
    }
}
