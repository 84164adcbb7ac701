//! Group domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::Gender;
use crate::errors::{DomainError, DomainResult};

/// Base every share link starts with.
pub const SHARE_LINK_BASE: &str = "https://start.the.night/";

/// Maximum stored length of a share link.
pub const MAX_SHARE_LINK_LENGTH: usize = 100;

/// Largest capacity the `INTEGER` column holds.
pub const MAX_TOTAL_MEMBERS: u32 = i32::MAX as u32;

/// A shared social unit owned by one profile.
///
/// Membership is tracked separately from ownership; the owner is not
/// implicitly a member. `share_link` is empty until the first save and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub gender: Gender,
    /// Advisory capacity; nothing rejects members beyond it.
    pub total_members: Option<u32>,
    pub share_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(owner_id: Uuid, gender: Gender, total_members: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            gender,
            total_members,
            share_link: None,
            created_at: super::timestamp_now(),
        }
    }

    /// True when a non-empty share link is present.
    pub fn has_share_link(&self) -> bool {
        self.share_link.as_deref().is_some_and(|link| !link.is_empty())
    }

    /// The random token at the end of the share link.
    pub fn share_token(&self) -> Option<&str> {
        self.share_link
            .as_deref()
            .and_then(|link| link.strip_prefix(SHARE_LINK_BASE))
            .filter(|token| !token.is_empty())
    }

    /// Whether `member_count` has reached the advertised capacity.
    pub fn is_full(&self, member_count: usize) -> bool {
        self.total_members
            .is_some_and(|capacity| member_count >= capacity as usize)
    }
}

/// Payload for creating a group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    pub gender: Option<Gender>,
    pub total_members: Option<u32>,
}

/// Rejects a capacity the store cannot hold.
pub fn validate_total_members(total_members: Option<u32>) -> DomainResult<()> {
    match total_members {
        Some(n) if n > MAX_TOTAL_MEMBERS => Err(DomainError::Validation(format!(
            "total_members must be at most {}",
            MAX_TOTAL_MEMBERS
        ))),
        _ => Ok(()),
    }
}

/// Builds a new share link from a random short identifier.
pub fn generate_share_link() -> String {
    format!("{}{}", SHARE_LINK_BASE, shared::crypto::short_uuid())
}

/// Returns true if `link` has the shape produced by [`generate_share_link`].
pub fn is_share_link(link: &str) -> bool {
    link.len() <= MAX_SHARE_LINK_LENGTH
        && link
            .strip_prefix(SHARE_LINK_BASE)
            .is_some_and(shared::crypto::is_short_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_share_link_shape() {
        let link = generate_share_link();
        assert!(link.starts_with("https://start.the.night/"));
        assert!(is_share_link(&link));
        assert!(link.len() <= MAX_SHARE_LINK_LENGTH);
    }

    #[test]
    fn test_is_share_link_rejects_foreign_urls() {
        assert!(!is_share_link("https://example.com/abc"));
        assert!(!is_share_link("https://start.the.night/"));
        assert!(!is_share_link("https://start.the.night/has spaces in it!!!"));
    }

    #[test]
    fn test_new_group_has_no_link() {
        let group = Group::new(Uuid::new_v4(), Gender::Female, Some(4));
        assert!(!group.has_share_link());
        assert_eq!(group.share_token(), None);
    }

    #[test]
    fn test_share_token() {
        let mut group = Group::new(Uuid::new_v4(), Gender::Male, None);
        group.share_link = Some(format!("{}abc", SHARE_LINK_BASE));
        assert_eq!(group.share_token(), Some("abc"));

        group.share_link = Some(String::new());
        assert!(!group.has_share_link());
    }

    #[test]
    fn test_total_members_bound() {
        assert!(validate_total_members(None).is_ok());
        assert!(validate_total_members(Some(MAX_TOTAL_MEMBERS)).is_ok());
        assert!(matches!(
            validate_total_members(Some(u32::MAX)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_is_full_is_advisory() {
        let group = Group::new(Uuid::new_v4(), Gender::Male, Some(2));
        assert!(!group.is_full(1));
        assert!(group.is_full(2));
        assert!(group.is_full(5));

        let unbounded = Group::new(Uuid::new_v4(), Gender::Male, None);
        assert!(!unbounded.is_full(1000));
    }
}
