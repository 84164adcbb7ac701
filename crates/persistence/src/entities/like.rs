//! Like entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct LikeEntity {
    pub id: i64,
    pub profile_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<LikeEntity> for domain::models::Like {
    fn from(entity: LikeEntity) -> Self {
        Self {
            id: entity.id,
            profile_id: entity.profile_id,
            created_at: entity.created_at,
        }
    }
}
