//! Refresh-token blacklist entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct BlacklistedTokenEntity {
    pub id: i64,
    pub jti_hash: String,
    pub profile_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub blacklisted_at: DateTime<Utc>,
}

impl From<BlacklistedTokenEntity> for domain::models::BlacklistedToken {
    fn from(entity: BlacklistedTokenEntity) -> Self {
        Self {
            jti_hash: entity.jti_hash,
            profile_id: entity.profile_id,
            expires_at: entity.expires_at,
            blacklisted_at: entity.blacklisted_at,
        }
    }
}
