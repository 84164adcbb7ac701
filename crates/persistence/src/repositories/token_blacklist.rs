//! Refresh-token blacklist repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::BlacklistedToken;
use domain::repositories::TokenBlacklistRepository;
use domain::DomainResult;
use sqlx::PgPool;

use crate::entities::BlacklistedTokenEntity;
use crate::error::db_err;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PgTokenBlacklistRepository {
    pool: PgPool,
}

impl PgTokenBlacklistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklistRepository for PgTokenBlacklistRepository {
    async fn insert(&self, token: &BlacklistedToken) -> DomainResult<bool> {
        let timer = QueryTimer::new("insert_blacklisted_token");
        let result = sqlx::query_as::<_, BlacklistedTokenEntity>(
            r#"
            INSERT INTO token_blacklist (jti_hash, profile_id, expires_at, blacklisted_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (jti_hash) DO NOTHING
            RETURNING id, jti_hash, profile_id, expires_at, blacklisted_at
            "#,
        )
        .bind(&token.jti_hash)
        .bind(token.profile_id)
        .bind(token.expires_at)
        .bind(token.blacklisted_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.is_some())
    }

    async fn contains(&self, jti_hash: &str) -> DomainResult<bool> {
        let timer = QueryTimer::new("is_token_blacklisted");
        let result: Result<(bool,), sqlx::Error> =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM token_blacklist WHERE jti_hash = $1)")
                .bind(jti_hash)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        Ok(result.map_err(db_err)?.0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let timer = QueryTimer::new("purge_expired_blacklisted_tokens");
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected())
    }
}
