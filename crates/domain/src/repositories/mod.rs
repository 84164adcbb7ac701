//! Persistence ports.
//!
//! Services depend on these traits, never on a concrete database. The
//! PostgreSQL implementations live in the `persistence` crate; the
//! [`memory::InMemoryStore`] implements every port over a single lock and is
//! used for tests and local runs.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::pagination::CursorPosition;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{BlacklistedToken, Group, Like, Photo, Profile};

pub use memory::InMemoryStore;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Inserts a new profile. A duplicate email fails with `Conflict`.
    async fn insert(&self, profile: &Profile) -> DomainResult<Profile>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Profile>>;

    /// Looks a profile up by its (already normalized) email.
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Profile>>;

    /// Overwrites every mutable column. Missing profile fails with `NotFound`.
    async fn update(&self, profile: &Profile) -> DomainResult<Profile>;

    /// Deletes a profile together with its photos, owned groups, memberships,
    /// block edges and blacklisted tokens, detaching its likes. Atomic.
    ///
    /// Returns false if no such profile existed.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;

    /// Profiles ordered by `(created_at, id)`, strictly after `after`.
    async fn list(&self, after: Option<CursorPosition>, limit: i64)
        -> DomainResult<Vec<Profile>>;

    /// Adds the directed edge `blocker -> blocked`. Returns false if present.
    async fn add_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool>;

    /// Removes the directed edge `blocker -> blocked`. Returns false if absent.
    async fn remove_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool>;

    /// Profiles `blocker_id` has blocked.
    async fn list_blocked(&self, blocker_id: Uuid) -> DomainResult<Vec<Profile>>;

    /// Profiles that have blocked `blocked_id`.
    async fn list_blockers(&self, blocked_id: Uuid) -> DomainResult<Vec<Profile>>;

    async fn is_blocked(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool>;
}

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Inserts a photo. An unknown owner fails with `Integrity`.
    async fn insert(&self, photo: &Photo) -> DomainResult<Photo>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Photo>>;

    /// Photos of a profile, oldest first.
    async fn list_for_profile(&self, profile_id: Uuid) -> DomainResult<Vec<Photo>>;

    /// Deletes a photo and returns the removed row.
    async fn delete(&self, id: Uuid) -> DomainResult<Option<Photo>>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Inserts a group. A duplicate share link fails with `Conflict`.
    async fn insert(&self, group: &Group) -> DomainResult<Group>;

    /// Updates gender and capacity. A stored share link is never replaced.
    async fn update(&self, group: &Group) -> DomainResult<Group>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Group>>;

    async fn find_by_share_link(&self, share_link: &str) -> DomainResult<Option<Group>>;

    async fn share_link_exists(&self, share_link: &str) -> DomainResult<bool>;

    async fn list_owned_by(&self, owner_id: Uuid) -> DomainResult<Vec<Group>>;

    async fn list_for_member(&self, profile_id: Uuid) -> DomainResult<Vec<Group>>;

    /// Deletes a group and its memberships. Returns false if absent.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;

    /// Returns false if the profile already was a member.
    async fn add_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<bool>;

    /// Returns false if the profile was not a member.
    async fn remove_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<bool>;

    async fn list_members(&self, group_id: Uuid) -> DomainResult<Vec<Profile>>;

    async fn count_members(&self, group_id: Uuid) -> DomainResult<i64>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn insert(&self, profile_id: Option<Uuid>) -> DomainResult<Like>;

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Like>>;

    /// Likes referencing a profile, oldest first.
    async fn list_for_profile(&self, profile_id: Uuid) -> DomainResult<Vec<Like>>;

    async fn delete(&self, id: i64) -> DomainResult<bool>;
}

#[async_trait]
pub trait TokenBlacklistRepository: Send + Sync {
    /// Records a blacklisted token. Returns false if the hash was already
    /// present, which means the token was used concurrently.
    async fn insert(&self, token: &BlacklistedToken) -> DomainResult<bool>;

    async fn contains(&self, jti_hash: &str) -> DomainResult<bool>;

    /// Drops entries whose token has expired anyway. Returns the count.
    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<u64>;
}
