//! In-memory implementation of every repository port.
//!
//! All tables live behind one `RwLock`, so each operation (including the
//! profile delete cascade) observes and mutates the state atomically.
//! It enforces the same uniqueness and reference rules as the SQL schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::pagination::CursorPosition;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    GroupRepository, LikeRepository, PhotoRepository, ProfileRepository,
    TokenBlacklistRepository,
};
use crate::errors::{DomainError, DomainResult};
use crate::models::group::validate_total_members;
use crate::models::{BlacklistedToken, Group, Like, Photo, Profile};

#[derive(Debug, Default)]
struct State {
    profiles: HashMap<Uuid, Profile>,
    /// Directed `(blocker, blocked)` edges.
    blocks: BTreeSet<(Uuid, Uuid)>,
    photos: HashMap<Uuid, Photo>,
    groups: HashMap<Uuid, Group>,
    /// `(group, profile)` membership pairs.
    members: BTreeSet<(Uuid, Uuid)>,
    likes: BTreeMap<i64, Like>,
    last_like_id: i64,
    blacklist: HashMap<String, BlacklistedToken>,
}

impl State {
    fn require_profile(&self, id: Uuid) -> DomainResult<()> {
        if self.profiles.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::Integrity(format!(
                "profile {} does not exist",
                id
            )))
        }
    }

    fn email_taken_by_other(&self, email: &str, id: Uuid) -> bool {
        self.profiles
            .values()
            .any(|p| p.email == email && p.id != id)
    }

    fn share_link_taken_by_other(&self, link: &str, id: Uuid) -> bool {
        self.groups
            .values()
            .any(|g| g.share_link.as_deref() == Some(link) && g.id != id)
    }

    fn profiles_sorted<I: IntoIterator<Item = Uuid>>(&self, ids: I) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = ids
            .into_iter()
            .filter_map(|id| self.profiles.get(&id).cloned())
            .collect();
        profiles.sort_by_key(|p| (p.created_at, p.id));
        profiles
    }

    fn groups_sorted<'a, I: IntoIterator<Item = &'a Group>>(groups: I) -> Vec<Group> {
        let mut groups: Vec<Group> = groups.into_iter().cloned().collect();
        groups.sort_by_key(|g| (g.created_at, g.id));
        groups
    }
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn insert(&self, profile: &Profile) -> DomainResult<Profile> {
        let mut state = self.state.write().await;
        if state.email_taken_by_other(&profile.email, profile.id) {
            return Err(DomainError::Conflict(format!(
                "email {} is already registered",
                profile.email
            )));
        }
        if state.profiles.contains_key(&profile.id) {
            return Err(DomainError::Conflict(format!(
                "profile {} already exists",
                profile.id
            )));
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Profile>> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.values().find(|p| p.email == email).cloned())
    }

    async fn update(&self, profile: &Profile) -> DomainResult<Profile> {
        let mut state = self.state.write().await;
        if !state.profiles.contains_key(&profile.id) {
            return Err(DomainError::NotFound(format!(
                "profile {} not found",
                profile.id
            )));
        }
        if state.email_taken_by_other(&profile.email, profile.id) {
            return Err(DomainError::Conflict(format!(
                "email {} is already registered",
                profile.email
            )));
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        if state.profiles.remove(&id).is_none() {
            return Ok(false);
        }

        state
            .blocks
            .retain(|(blocker, blocked)| *blocker != id && *blocked != id);
        state.photos.retain(|_, photo| photo.profile_id != id);

        let owned: Vec<Uuid> = state
            .groups
            .values()
            .filter(|g| g.owner_id == id)
            .map(|g| g.id)
            .collect();
        for group_id in &owned {
            state.groups.remove(group_id);
        }
        state
            .members
            .retain(|(group_id, profile_id)| *profile_id != id && !owned.contains(group_id));

        for like in state.likes.values_mut() {
            if like.profile_id == Some(id) {
                like.profile_id = None;
            }
        }
        state.blacklist.retain(|_, token| token.profile_id != id);

        Ok(true)
    }

    async fn list(
        &self,
        after: Option<CursorPosition>,
        limit: i64,
    ) -> DomainResult<Vec<Profile>> {
        let state = self.state.read().await;
        let mut profiles: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| match after {
                Some(cursor) => (p.created_at, p.id) > (cursor.created_at, cursor.id),
                None => true,
            })
            .cloned()
            .collect();
        profiles.sort_by_key(|p| (p.created_at, p.id));
        profiles.truncate(limit.max(0) as usize);
        Ok(profiles)
    }

    async fn add_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        state.require_profile(blocker_id)?;
        state.require_profile(blocked_id)?;
        if blocker_id == blocked_id {
            return Err(DomainError::Validation(
                "a profile cannot block itself".to_string(),
            ));
        }
        Ok(state.blocks.insert((blocker_id, blocked_id)))
    }

    async fn remove_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.blocks.remove(&(blocker_id, blocked_id)))
    }

    async fn list_blocked(&self, blocker_id: Uuid) -> DomainResult<Vec<Profile>> {
        let state = self.state.read().await;
        let ids: Vec<Uuid> = state
            .blocks
            .iter()
            .filter(|(blocker, _)| *blocker == blocker_id)
            .map(|(_, blocked)| *blocked)
            .collect();
        Ok(state.profiles_sorted(ids))
    }

    async fn list_blockers(&self, blocked_id: Uuid) -> DomainResult<Vec<Profile>> {
        let state = self.state.read().await;
        let ids: Vec<Uuid> = state
            .blocks
            .iter()
            .filter(|(_, blocked)| *blocked == blocked_id)
            .map(|(blocker, _)| *blocker)
            .collect();
        Ok(state.profiles_sorted(ids))
    }

    async fn is_blocked(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool> {
        let state = self.state.read().await;
        Ok(state.blocks.contains(&(blocker_id, blocked_id)))
    }
}

#[async_trait]
impl PhotoRepository for InMemoryStore {
    async fn insert(&self, photo: &Photo) -> DomainResult<Photo> {
        let mut state = self.state.write().await;
        state.require_profile(photo.profile_id)?;
        if state.photos.contains_key(&photo.id) {
            return Err(DomainError::Conflict(format!(
                "photo {} already exists",
                photo.id
            )));
        }
        state.photos.insert(photo.id, photo.clone());
        Ok(photo.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Photo>> {
        Ok(self.state.read().await.photos.get(&id).cloned())
    }

    async fn list_for_profile(&self, profile_id: Uuid) -> DomainResult<Vec<Photo>> {
        let state = self.state.read().await;
        let mut photos: Vec<Photo> = state
            .photos
            .values()
            .filter(|p| p.profile_id == profile_id)
            .cloned()
            .collect();
        photos.sort_by_key(|p| (p.created_at, p.id));
        Ok(photos)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<Option<Photo>> {
        Ok(self.state.write().await.photos.remove(&id))
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn insert(&self, group: &Group) -> DomainResult<Group> {
        validate_total_members(group.total_members)?;
        let mut state = self.state.write().await;
        state.require_profile(group.owner_id)?;
        if let Some(link) = group.share_link.as_deref() {
            if state.share_link_taken_by_other(link, group.id) {
                return Err(DomainError::Conflict(format!(
                    "share link {} is already in use",
                    link
                )));
            }
        }
        if state.groups.contains_key(&group.id) {
            return Err(DomainError::Conflict(format!(
                "group {} already exists",
                group.id
            )));
        }
        state.groups.insert(group.id, group.clone());
        Ok(group.clone())
    }

    async fn update(&self, group: &Group) -> DomainResult<Group> {
        validate_total_members(group.total_members)?;
        let mut state = self.state.write().await;
        let stored_link = match state.groups.get(&group.id) {
            Some(stored) => stored.share_link.clone(),
            None => {
                return Err(DomainError::NotFound(format!(
                    "group {} not found",
                    group.id
                )))
            }
        };

        let share_link = match stored_link {
            Some(link) => Some(link),
            None => {
                if let Some(link) = group.share_link.as_deref() {
                    if state.share_link_taken_by_other(link, group.id) {
                        return Err(DomainError::Conflict(format!(
                            "share link {} is already in use",
                            link
                        )));
                    }
                }
                group.share_link.clone()
            }
        };

        let updated = Group {
            share_link,
            ..group.clone()
        };
        state.groups.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Group>> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }

    async fn find_by_share_link(&self, share_link: &str) -> DomainResult<Option<Group>> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .values()
            .find(|g| g.share_link.as_deref() == Some(share_link))
            .cloned())
    }

    async fn share_link_exists(&self, share_link: &str) -> DomainResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .values()
            .any(|g| g.share_link.as_deref() == Some(share_link)))
    }

    async fn list_owned_by(&self, owner_id: Uuid) -> DomainResult<Vec<Group>> {
        let state = self.state.read().await;
        Ok(State::groups_sorted(
            state.groups.values().filter(|g| g.owner_id == owner_id),
        ))
    }

    async fn list_for_member(&self, profile_id: Uuid) -> DomainResult<Vec<Group>> {
        let state = self.state.read().await;
        Ok(State::groups_sorted(
            state
                .members
                .iter()
                .filter(|(_, member)| *member == profile_id)
                .filter_map(|(group_id, _)| state.groups.get(group_id)),
        ))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        if state.groups.remove(&id).is_none() {
            return Ok(false);
        }
        state.members.retain(|(group_id, _)| *group_id != id);
        Ok(true)
    }

    async fn add_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&group_id) {
            return Err(DomainError::Integrity(format!(
                "group {} does not exist",
                group_id
            )));
        }
        state.require_profile(profile_id)?;
        Ok(state.members.insert((group_id, profile_id)))
    }

    async fn remove_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.members.remove(&(group_id, profile_id)))
    }

    async fn list_members(&self, group_id: Uuid) -> DomainResult<Vec<Profile>> {
        let state = self.state.read().await;
        let ids: Vec<Uuid> = state
            .members
            .iter()
            .filter(|(group, _)| *group == group_id)
            .map(|(_, member)| *member)
            .collect();
        Ok(state.profiles_sorted(ids))
    }

    async fn count_members(&self, group_id: Uuid) -> DomainResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .members
            .iter()
            .filter(|(group, _)| *group == group_id)
            .count() as i64)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn insert(&self, profile_id: Option<Uuid>) -> DomainResult<Like> {
        let mut state = self.state.write().await;
        if let Some(profile_id) = profile_id {
            state.require_profile(profile_id)?;
        }
        state.last_like_id += 1;
        let like = Like {
            id: state.last_like_id,
            profile_id,
            created_at: crate::models::timestamp_now(),
        };
        state.likes.insert(like.id, like.clone());
        Ok(like)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Like>> {
        Ok(self.state.read().await.likes.get(&id).cloned())
    }

    async fn list_for_profile(&self, profile_id: Uuid) -> DomainResult<Vec<Like>> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .values()
            .filter(|l| l.profile_id == Some(profile_id))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        Ok(self.state.write().await.likes.remove(&id).is_some())
    }
}

#[async_trait]
impl TokenBlacklistRepository for InMemoryStore {
    async fn insert(&self, token: &BlacklistedToken) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        state.require_profile(token.profile_id)?;
        if state.blacklist.contains_key(&token.jti_hash) {
            return Ok(false);
        }
        state
            .blacklist
            .insert(token.jti_hash.clone(), token.clone());
        Ok(true)
    }

    async fn contains(&self, jti_hash: &str) -> DomainResult<bool> {
        Ok(self.state.read().await.blacklist.contains_key(jti_hash))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let mut state = self.state.write().await;
        let before = state.blacklist.len();
        state.blacklist.retain(|_, token| token.expires_at > now);
        Ok((before - state.blacklist.len()) as u64)
    }
}
