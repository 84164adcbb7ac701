//! Like records.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::Like;
use crate::repositories::{LikeRepository, ProfileRepository};

#[derive(Clone)]
pub struct LikeService {
    profiles: Arc<dyn ProfileRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl LikeService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, likes: Arc<dyn LikeRepository>) -> Self {
        Self { profiles, likes }
    }

    pub async fn record(&self, profile_id: Uuid) -> DomainResult<Like> {
        self.require_profile(profile_id).await?;
        let like = self.likes.insert(Some(profile_id)).await?;
        info!(like_id = like.id, %profile_id, "Like recorded");
        Ok(like)
    }

    pub async fn get(&self, id: i64) -> DomainResult<Like> {
        self.likes
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("like {} not found", id)))
    }

    /// Likes still attached to the profile.
    pub async fn for_profile(&self, profile_id: Uuid) -> DomainResult<Vec<Like>> {
        self.require_profile(profile_id).await?;
        self.likes.list_for_profile(profile_id).await
    }

    pub async fn remove(&self, id: i64) -> DomainResult<()> {
        if !self.likes.delete(id).await? {
            return Err(DomainError::NotFound(format!("like {} not found", id)));
        }
        Ok(())
    }

    async fn require_profile(&self, id: Uuid) -> DomainResult<()> {
        match self.profiles.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound(format!("profile {} not found", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use crate::repositories::InMemoryStore;

    #[tokio::test]
    async fn test_like_survives_profile_deletion() {
        let store = Arc::new(InMemoryStore::new());
        let likes = LikeService::new(store.clone(), store.clone());
        let profile = ProfileRepository::insert(
            store.as_ref(),
            &Profile::new("a@example.com".to_string(), "hash".to_string()),
        )
        .await
        .unwrap();

        let like = likes.record(profile.id).await.unwrap();
        assert_eq!(likes.for_profile(profile.id).await.unwrap(), vec![like.clone()]);

        ProfileRepository::delete(store.as_ref(), profile.id).await.unwrap();

        let detached = likes.get(like.id).await.unwrap();
        assert!(detached.is_detached());
        assert!(likes.for_profile(profile.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_record_and_remove() {
        let store = Arc::new(InMemoryStore::new());
        let likes = LikeService::new(store.clone(), store.clone());

        assert!(likes.record(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(likes
            .for_profile(Uuid::new_v4())
            .await
            .unwrap_err()
            .is_not_found());

        let profile = ProfileRepository::insert(
            store.as_ref(),
            &Profile::new("a@example.com".to_string(), "hash".to_string()),
        )
        .await
        .unwrap();
        let like = likes.record(profile.id).await.unwrap();

        likes.remove(like.id).await.unwrap();
        assert!(likes.get(like.id).await.unwrap_err().is_not_found());
        assert!(likes.remove(like.id).await.unwrap_err().is_not_found());
    }
}
