//! Like repository for database operations.

use async_trait::async_trait;
use domain::models::Like;
use domain::repositories::LikeRepository;
use domain::DomainResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::LikeEntity;
use crate::error::db_err;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn insert(&self, profile_id: Option<Uuid>) -> DomainResult<Like> {
        let timer = QueryTimer::new("insert_like");
        let result = sqlx::query_as::<_, LikeEntity>(
            "INSERT INTO likes (profile_id) VALUES ($1) RETURNING id, profile_id, created_at",
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.into())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Like>> {
        let timer = QueryTimer::new("find_like_by_id");
        let result = sqlx::query_as::<_, LikeEntity>(
            "SELECT id, profile_id, created_at FROM likes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.map(Into::into))
    }

    async fn list_for_profile(&self, profile_id: Uuid) -> DomainResult<Vec<Like>> {
        let timer = QueryTimer::new("list_likes_for_profile");
        let result = sqlx::query_as::<_, LikeEntity>(
            r#"
            SELECT id, profile_id, created_at
            FROM likes
            WHERE profile_id = $1
            ORDER BY id
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_like");
        let result = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected() > 0)
    }
}
