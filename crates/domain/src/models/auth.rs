//! Authentication domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Token pair issued on login or refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthTokens {
    pub profile_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// A refresh token that may no longer be used.
///
/// Only the SHA-256 of the token's `jti` is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistedToken {
    pub jti_hash: String,
    pub profile_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub blacklisted_at: DateTime<Utc>,
}
