//! Photo uploads backed by blob storage.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::photo::{normalize_extension, storage_key, ALLOWED_EXTENSIONS, MAX_PHOTO_BYTES};
use crate::models::Photo;
use crate::repositories::{PhotoRepository, ProfileRepository};
use crate::storage::BlobStorage;

#[derive(Clone)]
pub struct PhotoService {
    profiles: Arc<dyn ProfileRepository>,
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn BlobStorage>,
}

impl PhotoService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        photos: Arc<dyn PhotoRepository>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            profiles,
            photos,
            storage,
        }
    }

    /// Stores the image bytes and records the photo.
    ///
    /// Bytes land at `images/<profile_id>/<photo_id>.<ext>`. Nothing is
    /// written for an unknown profile. If the row cannot be recorded the blob
    /// is removed again.
    pub async fn upload(
        &self,
        profile_id: Uuid,
        content: &[u8],
        extension: &str,
    ) -> DomainResult<Photo> {
        let extension = normalize_extension(extension).ok_or_else(|| {
            DomainError::Validation(format!(
                "unsupported image type, expected one of: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;
        if content.is_empty() {
            return Err(DomainError::Validation("image is empty".to_string()));
        }
        if content.len() > MAX_PHOTO_BYTES {
            return Err(DomainError::Validation(format!(
                "image exceeds {} bytes",
                MAX_PHOTO_BYTES
            )));
        }

        if self.profiles.find_by_id(profile_id).await?.is_none() {
            return Err(DomainError::NotFound(format!(
                "profile {} not found",
                profile_id
            )));
        }

        let mut photo = Photo::new(profile_id, None);
        let key = storage_key(profile_id, photo.id, &extension);
        photo.image = Some(self.storage.put(&key, content).await?);

        match self.photos.insert(&photo).await {
            Ok(photo) => {
                info!(%profile_id, photo_id = %photo.id, size = content.len(), "Photo uploaded");
                Ok(photo)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    warn!(%key, error = %cleanup, "Failed to remove blob of unrecorded photo");
                }
                Err(e)
            }
        }
    }

    /// Photos of a profile, oldest first.
    pub async fn list(&self, profile_id: Uuid) -> DomainResult<Vec<Photo>> {
        if self.profiles.find_by_id(profile_id).await?.is_none() {
            return Err(DomainError::NotFound(format!(
                "profile {} not found",
                profile_id
            )));
        }
        self.photos.list_for_profile(profile_id).await
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Photo> {
        self.photos
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("photo {} not found", id)))
    }

    /// Deletes the photo row and then its blob.
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let photo = self
            .photos
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("photo {} not found", id)))?;

        if let Some(key) = photo.image.as_deref() {
            self.storage.delete(key).await?;
        }
        info!(photo_id = %id, profile_id = %photo.profile_id, "Photo deleted");
        Ok(())
    }

    /// Public URL of the stored image, if the photo has one.
    pub fn url(&self, photo: &Photo) -> Option<String> {
        photo.image.as_deref().map(|key| self.storage.url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use crate::repositories::InMemoryStore;
    use crate::storage::InMemoryBlobStorage;

    struct Fixture {
        store: Arc<InMemoryStore>,
        blobs: InMemoryBlobStorage,
        photos: PhotoService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let blobs = InMemoryBlobStorage::new("https://cdn.example.com/");
        let photos = PhotoService::new(store.clone(), store.clone(), Arc::new(blobs.clone()));
        Fixture {
            store,
            blobs,
            photos,
        }
    }

    async fn owner(store: &InMemoryStore) -> Profile {
        ProfileRepository::insert(
            store,
            &Profile::new("owner@example.com".to_string(), "hash".to_string()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_upload_writes_blob_under_profile_key() {
        let f = fixture();
        let profile = owner(&f.store).await;

        let photo = f.photos.upload(profile.id, b"\x89PNG", "PNG").await.unwrap();

        let key = photo.image.clone().unwrap();
        assert_eq!(key, format!("images/{}/{}.png", profile.id, photo.id));
        assert_eq!(f.blobs.open(&key).await.unwrap(), b"\x89PNG");
        assert_eq!(
            f.photos.url(&photo).unwrap(),
            format!("https://cdn.example.com/{}", key)
        );
        assert_eq!(f.photos.list(profile.id).await.unwrap(), vec![photo]);
    }

    #[tokio::test]
    async fn test_upload_for_unknown_profile_writes_nothing() {
        let f = fixture();
        let err = f
            .photos
            .upload(Uuid::new_v4(), b"bytes", "jpg")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(f.blobs.is_empty().await);
        assert!(f.photos.list(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_payloads() {
        let f = fixture();
        let profile = owner(&f.store).await;

        let err = f.photos.upload(profile.id, b"bytes", "exe").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = f.photos.upload(profile.id, b"", "jpg").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_blob() {
        let f = fixture();
        let profile = owner(&f.store).await;
        let photo = f.photos.upload(profile.id, b"bytes", "jpg").await.unwrap();

        f.photos.delete(photo.id).await.unwrap();

        assert!(f.photos.get(photo.id).await.unwrap_err().is_not_found());
        assert!(f.blobs.is_empty().await);
        assert!(f.photos.delete(photo.id).await.unwrap_err().is_not_found());
    }
}
