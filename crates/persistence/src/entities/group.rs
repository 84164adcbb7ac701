//! Group entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::profile::GenderDb;

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub gender: GenderDb,
    pub total_members: Option<i32>,
    pub share_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            gender: entity.gender.into(),
            total_members: entity.total_members.map(|n| n.max(0) as u32),
            share_link: entity.share_link,
            created_at: entity.created_at,
        }
    }
}
