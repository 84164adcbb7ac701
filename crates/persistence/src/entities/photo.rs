//! Photo entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PhotoEntity {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PhotoEntity> for domain::models::Photo {
    fn from(entity: PhotoEntity) -> Self {
        Self {
            id: entity.id,
            profile_id: entity.profile_id,
            image: entity.image,
            created_at: entity.created_at,
        }
    }
}
