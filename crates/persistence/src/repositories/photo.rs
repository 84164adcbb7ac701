//! Photo repository for database operations.

use async_trait::async_trait;
use domain::models::Photo;
use domain::repositories::PhotoRepository;
use domain::DomainResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PhotoEntity;
use crate::error::db_err;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PgPhotoRepository {
    pool: PgPool,
}

impl PgPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoRepository for PgPhotoRepository {
    async fn insert(&self, photo: &Photo) -> DomainResult<Photo> {
        let timer = QueryTimer::new("insert_photo");
        let result = sqlx::query_as::<_, PhotoEntity>(
            r#"
            INSERT INTO photos (id, profile_id, image, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, profile_id, image, created_at
            "#,
        )
        .bind(photo.id)
        .bind(photo.profile_id)
        .bind(&photo.image)
        .bind(photo.created_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.into())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Photo>> {
        let timer = QueryTimer::new("find_photo_by_id");
        let result = sqlx::query_as::<_, PhotoEntity>(
            "SELECT id, profile_id, image, created_at FROM photos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.map(Into::into))
    }

    async fn list_for_profile(&self, profile_id: Uuid) -> DomainResult<Vec<Photo>> {
        let timer = QueryTimer::new("list_photos_for_profile");
        let result = sqlx::query_as::<_, PhotoEntity>(
            r#"
            SELECT id, profile_id, image, created_at
            FROM photos
            WHERE profile_id = $1
            ORDER BY created_at, id
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

    async fn delete(&self, id: Uuid) -> DomainResult<Option<Photo>> {
        let timer = QueryTimer::new("delete_photo");
        let result = sqlx::query_as::<_, PhotoEntity>(
            "DELETE FROM photos WHERE id = $1 RETURNING id, profile_id, image, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.map(Into::into))
    }
}
