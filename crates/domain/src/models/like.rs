//! Like domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A like record.
///
/// The profile reference survives the profile: deleting the profile sets
/// `profile_id` to `None` instead of deleting the like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Like {
    pub id: i64,
    pub profile_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// Whether the referenced profile has been deleted.
    pub fn is_detached(&self) -> bool {
        self.profile_id.is_none()
    }
}

impl fmt::Display for Like {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.profile_id {
            Some(profile_id) => write!(f, "like {} : {}", self.id, profile_id),
            None => write!(f, "like {} : detached", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let like = Like {
            id: 7,
            profile_id: Some(Uuid::nil()),
            created_at: crate::models::timestamp_now(),
        };
        assert_eq!(
            like.to_string(),
            "like 7 : 00000000-0000-0000-0000-000000000000"
        );

        let detached = Like {
            profile_id: None,
            ..like
        };
        assert!(detached.is_detached());
        assert_eq!(detached.to_string(), "like 7 : detached");
    }
}
