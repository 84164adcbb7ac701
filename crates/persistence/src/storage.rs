//! Local file system blob storage.

use async_trait::async_trait;
use domain::storage::{join_url, BlobStorage};
use domain::{DomainError, DomainResult};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Stores blobs below a media root directory.
///
/// Public URLs are `base_url` joined with the key, so a media root of
/// `static` and a base URL of `/` serve `images/...` keys from
/// `/images/...`.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key below the root, refusing keys that would escape it.
    fn path_for(&self, key: &str) -> DomainResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(DomainError::Storage(format!("invalid blob key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

fn storage_err(key: &str, err: std::io::Error) -> DomainError {
    DomainError::Storage(format!("{}: {}", key, err))
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn put(&self, key: &str, content: &[u8]) -> DomainResult<String> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_err(key, e))?;
        }
        fs::write(&path, content)
            .await
            .map_err(|e| storage_err(key, e))?;

        debug!(%key, size = content.len(), "Blob written");
        Ok(key.to_string())
    }

    async fn open(&self, key: &str) -> DomainResult<Vec<u8>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DomainError::NotFound(format!("blob {} not found", key)))
            }
            Err(e) => Err(storage_err(key, e)),
        }
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err(key, e)),
        }
    }

    async fn exists(&self, key: &str) -> DomainResult<bool> {
        let path = self.path_for(key)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_err(key, e)),
        }
    }

    fn url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, LocalBlobStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalBlobStorage::new(dir.path(), "/");
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_creates_directories_and_overwrites() {
        let (dir, storage) = storage();

        storage.put("images/p/1.jpg", b"first").await.unwrap();
        storage.put("images/p/1.jpg", b"second").await.unwrap();

        assert!(dir.path().join("images/p/1.jpg").is_file());
        assert_eq!(storage.open("images/p/1.jpg").await.unwrap(), b"second");
        assert!(storage.exists("images/p/1.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, storage) = storage();
        storage.put("images/a.png", b"x").await.unwrap();

        storage.delete("images/a.png").await.unwrap();
        storage.delete("images/a.png").await.unwrap();

        assert!(!storage.exists("images/a.png").await.unwrap());
        assert!(storage.open("images/a.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let (_dir, storage) = storage();
        for key in ["../outside.png", "/etc/passwd", "images/../../x", ""] {
            let err = storage.put(key, b"x").await.unwrap_err();
            assert!(matches!(err, DomainError::Storage(_)), "{key}");
        }
    }

    #[test]
    fn test_url_uses_media_base() {
        let storage = LocalBlobStorage::new("static", "/");
        assert_eq!(storage.url("images/p/1.jpg"), "/images/p/1.jpg");
    }
}
