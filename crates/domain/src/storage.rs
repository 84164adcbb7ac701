//! Blob storage port for uploaded photo bytes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::{DomainError, DomainResult};

/// Object storage backend.
///
/// Keys are relative paths such as `images/<profile_id>/<photo_id>.jpg`.
/// Writing to an existing key overwrites it.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `content` under `key` and returns the stored key.
    async fn put(&self, key: &str, content: &[u8]) -> DomainResult<String>;

    /// Reads the bytes stored under `key`. A missing key is `NotFound`.
    async fn open(&self, key: &str) -> DomainResult<Vec<u8>>;

    /// Removes `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> DomainResult<()>;

    async fn exists(&self, key: &str) -> DomainResult<bool>;

    /// Public URL the object is served from.
    fn url(&self, key: &str) -> String;
}

/// Joins a base URL and a key with exactly one slash between them.
pub fn join_url(base_url: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Blob storage kept in process memory.
#[derive(Debug, Clone)]
pub struct InMemoryBlobStorage {
    base_url: String,
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for InMemoryBlobStorage {
    fn default() -> Self {
        Self::new("/")
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn put(&self, key: &str, content: &[u8]) -> DomainResult<String> {
        if key.is_empty() {
            return Err(DomainError::Storage("blob key is empty".to_string()));
        }
        self.objects
            .write()
            .await
            .insert(key.to_string(), content.to_vec());
        Ok(key.to_string())
    }

    async fn open(&self, key: &str) -> DomainResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("blob {} not found", key)))
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> DomainResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    fn url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }
}
