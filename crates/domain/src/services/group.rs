//! Groups, their share links and memberships.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::group::{generate_share_link, is_share_link, validate_total_members};
use crate::models::{CreateGroupRequest, Group, Profile};
use crate::repositories::{GroupRepository, ProfileRepository};

/// Candidate links tried before giving up with `Conflict`.
pub const SHARE_LINK_MAX_ATTEMPTS: usize = 5;

type LinkGenerator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct GroupService {
    profiles: Arc<dyn ProfileRepository>,
    groups: Arc<dyn GroupRepository>,
    link_generator: LinkGenerator,
}

impl GroupService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, groups: Arc<dyn GroupRepository>) -> Self {
        Self::with_link_generator(profiles, groups, Arc::new(generate_share_link))
    }

    /// Builds the service with a custom share-link source.
    pub fn with_link_generator(
        profiles: Arc<dyn ProfileRepository>,
        groups: Arc<dyn GroupRepository>,
        link_generator: LinkGenerator,
    ) -> Self {
        Self {
            profiles,
            groups,
            link_generator,
        }
    }

    /// Creates a group owned by `owner_id` with its share link in place.
    pub async fn create(&self, owner_id: Uuid, request: CreateGroupRequest) -> DomainResult<Group> {
        validate_total_members(request.total_members)?;
        self.require_profile(owner_id).await?;

        let mut group = Group::new(
            owner_id,
            request.gender.unwrap_or_default(),
            request.total_members,
        );
        self.ensure_share_link(&mut group).await?;

        let group = self.groups.insert(&group).await?;
        info!(group_id = %group.id, %owner_id, "Group created");
        Ok(group)
    }

    /// Persists edits to gender and capacity.
    ///
    /// A stored share link is carried over; asking to replace it with a
    /// different link fails with `Validation`. A group saved without a link
    /// gets one generated.
    pub async fn save(&self, mut group: Group) -> DomainResult<Group> {
        validate_total_members(group.total_members)?;
        let stored = self.get(group.id).await?;

        match stored.share_link {
            Some(ref link) if !link.is_empty() => {
                if let Some(incoming) = group.share_link.as_deref() {
                    if !incoming.is_empty() && incoming != link {
                        return Err(DomainError::Validation(
                            "share link cannot be changed once set".to_string(),
                        ));
                    }
                }
                group.share_link = stored.share_link.clone();
            }
            _ => {
                if let Some(incoming) = group.share_link.as_deref() {
                    if !incoming.is_empty() && !is_share_link(incoming) {
                        return Err(DomainError::Validation(format!(
                            "{} is not a valid share link",
                            incoming
                        )));
                    }
                }
                self.ensure_share_link(&mut group).await?;
            }
        }

        group.owner_id = stored.owner_id;
        group.created_at = stored.created_at;
        self.groups.update(&group).await
    }

    /// Generates a share link if `group` has none.
    ///
    /// Each candidate is checked against existing links; after
    /// [`SHARE_LINK_MAX_ATTEMPTS`] collisions the call fails with `Conflict`.
    pub async fn ensure_share_link(&self, group: &mut Group) -> DomainResult<()> {
        if group.has_share_link() {
            return Ok(());
        }

        for attempt in 1..=SHARE_LINK_MAX_ATTEMPTS {
            let candidate = (self.link_generator)();
            if !self.groups.share_link_exists(&candidate).await? {
                group.share_link = Some(candidate);
                return Ok(());
            }
            warn!(group_id = %group.id, attempt, "Share link collision");
        }

        Err(DomainError::Conflict(format!(
            "could not generate a unique share link in {} attempts",
            SHARE_LINK_MAX_ATTEMPTS
        )))
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Group> {
        self.groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("group {} not found", id)))
    }

    pub async fn find_by_share_link(&self, share_link: &str) -> DomainResult<Group> {
        self.groups
            .find_by_share_link(share_link)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no group shares {}", share_link)))
    }

    pub async fn owned_by(&self, profile_id: Uuid) -> DomainResult<Vec<Group>> {
        self.require_profile(profile_id).await?;
        self.groups.list_owned_by(profile_id).await
    }

    /// Groups the profile is a member of. Ownership alone does not count.
    pub async fn groups_for_member(&self, profile_id: Uuid) -> DomainResult<Vec<Group>> {
        self.require_profile(profile_id).await?;
        self.groups.list_for_member(profile_id).await
    }

    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.groups.delete(id).await? {
            return Err(DomainError::NotFound(format!("group {} not found", id)));
        }
        info!(group_id = %id, "Group deleted");
        Ok(())
    }

    /// Adds a member. Adding an existing member is a no-op.
    ///
    /// Capacity is advisory: exceeding `total_members` only logs.
    pub async fn add_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<()> {
        let group = self.get(group_id).await?;
        self.require_profile(profile_id).await?;

        if !self.groups.add_member(group_id, profile_id).await? {
            return Ok(());
        }

        let count = self.groups.count_members(group_id).await?;
        if let Some(capacity) = group.total_members {
            if count > capacity as i64 {
                warn!(%group_id, count, capacity, "Group is over capacity");
            }
        }
        info!(%group_id, %profile_id, "Member added");
        Ok(())
    }

    /// Removes a member. A profile that is not a member is a no-op.
    pub async fn remove_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<()> {
        self.get(group_id).await?;
        self.require_profile(profile_id).await?;

        if self.groups.remove_member(group_id, profile_id).await? {
            info!(%group_id, %profile_id, "Member removed");
        }
        Ok(())
    }

    pub async fn members(&self, group_id: Uuid) -> DomainResult<Vec<Profile>> {
        self.get(group_id).await?;
        self.groups.list_members(group_id).await
    }

    /// Whether the group has reached its advertised capacity.
    pub async fn is_full(&self, group_id: Uuid) -> DomainResult<bool> {
        let group = self.get(group_id).await?;
        let count = self.groups.count_members(group_id).await?;
        Ok(group.is_full(count.max(0) as usize))
    }

    async fn require_profile(&self, id: Uuid) -> DomainResult<()> {
        match self.profiles.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound(format!("profile {} not found", id))),
        }
    }
}
