//! Profile repository for database operations.

use async_trait::async_trait;
use domain::models::Profile;
use domain::repositories::ProfileRepository;
use domain::DomainResult;
use shared::pagination::CursorPosition;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GenderDb, ProfileEntity, ShowMeDb};
use crate::error::{db_err, to_int4};
use crate::metrics::QueryTimer;

/// Repository for profiles and the block relation between them.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn insert(&self, profile: &Profile) -> DomainResult<Profile> {
        let age = profile
            .age
            .map(|v| to_int4(v, "age"))
            .transpose()?;
        let timer = QueryTimer::new("insert_profile");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            INSERT INTO profiles (
                id, email, password_hash, firstname, lastname, is_staff, is_active,
                created_at, has_account, birthdate, age, nationality, city, university,
                description, gender, show_me
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id, email, password_hash, firstname, lastname, is_staff, is_active,
                      created_at, has_account, birthdate, age, nationality, city, university,
                      description, gender, show_me
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.password_hash)
        .bind(&profile.firstname)
        .bind(&profile.lastname)
        .bind(profile.is_staff)
        .bind(profile.is_active)
        .bind(profile.created_at)
        .bind(profile.has_account)
        .bind(profile.birthdate)
        .bind(age)
        .bind(&profile.nationality)
        .bind(&profile.city)
        .bind(&profile.university)
        .bind(&profile.description)
        .bind(GenderDb::from(profile.gender))
        .bind(ShowMeDb::from(profile.show_me))
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.into())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Profile>> {
        let timer = QueryTimer::new("find_profile_by_id");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT id, email, password_hash, firstname, lastname, is_staff, is_active,
                   created_at, has_account, birthdate, age, nationality, city, university,
                   description, gender, show_me
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Profile>> {
        let timer = QueryTimer::new("find_profile_by_email");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT id, email, password_hash, firstname, lastname, is_staff, is_active,
                   created_at, has_account, birthdate, age, nationality, city, university,
                   description, gender, show_me
            FROM profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.map(Into::into))
    }

    async fn update(&self, profile: &Profile) -> DomainResult<Profile> {
        let age = profile
            .age
            .map(|v| to_int4(v, "age"))
            .transpose()?;
        let timer = QueryTimer::new("update_profile");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            UPDATE profiles
            SET email = $2, password_hash = $3, firstname = $4, lastname = $5,
                is_staff = $6, is_active = $7, has_account = $8, birthdate = $9, age = $10,
                nationality = $11, city = $12, university = $13, description = $14,
                gender = $15, show_me = $16
            WHERE id = $1
            RETURNING id, email, password_hash, firstname, lastname, is_staff, is_active,
                      created_at, has_account, birthdate, age, nationality, city, university,
                      description, gender, show_me
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.password_hash)
        .bind(&profile.firstname)
        .bind(&profile.lastname)
        .bind(profile.is_staff)
        .bind(profile.is_active)
        .bind(profile.has_account)
        .bind(profile.birthdate)
        .bind(age)
        .bind(&profile.nationality)
        .bind(&profile.city)
        .bind(&profile.university)
        .bind(&profile.description)
        .bind(GenderDb::from(profile.gender))
        .bind(ShowMeDb::from(profile.show_me))
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.into())
    }

    /// Photos, owned groups, memberships, block edges and blacklist rows go
    /// with the profile through `ON DELETE CASCADE`; likes are nulled.
    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_profile");
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected() > 0)
    }

    async fn list(
        &self,
        after: Option<CursorPosition>,
        limit: i64,
    ) -> DomainResult<Vec<Profile>> {
        let timer = QueryTimer::new("list_profiles");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT id, email, password_hash, firstname, lastname, is_staff, is_active,
                   created_at, has_account, birthdate, age, nationality, city, university,
                   description, gender, show_me
            FROM profiles
            WHERE $1::timestamptz IS NULL OR (created_at, id) > ($1, $2)
            ORDER BY created_at, id
            LIMIT $3
            "#,
        )
        .bind(after.map(|c| c.created_at))
        .bind(after.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn add_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("add_profile_block");
        let result = sqlx::query(
            r#"
            INSERT INTO profile_blocked_profiles (from_profile_id, to_profile_id)
            VALUES ($1, $2)
            ON CONFLICT (from_profile_id, to_profile_id) DO NOTHING
            "#,
        )
        .bind(blocker_id)
        .bind(blocked_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected() > 0)
    }

    async fn remove_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("remove_profile_block");
        let result = sqlx::query(
            r#"
            DELETE FROM profile_blocked_profiles
            WHERE from_profile_id = $1 AND to_profile_id = $2
            "#,
        )
        .bind(blocker_id)
        .bind(blocked_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected() > 0)
    }

    async fn list_blocked(&self, blocker_id: Uuid) -> DomainResult<Vec<Profile>> {
        let timer = QueryTimer::new("list_blocked_profiles");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT p.id, p.email, p.password_hash, p.firstname, p.lastname, p.is_staff,
                   p.is_active, p.created_at, p.has_account, p.birthdate, p.age,
                   p.nationality, p.city, p.university, p.description, p.gender, p.show_me
            FROM profile_blocked_profiles b
            JOIN profiles p ON p.id = b.to_profile_id
            WHERE b.from_profile_id = $1
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(blocker_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list_blockers(&self, blocked_id: Uuid) -> DomainResult<Vec<Profile>> {
        let timer = QueryTimer::new("list_blocking_profiles");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT p.id, p.email, p.password_hash, p.firstname, p.lastname, p.is_staff,
                   p.is_active, p.created_at, p.has_account, p.birthdate, p.age,
                   p.nationality, p.city, p.university, p.description, p.gender, p.show_me
            FROM profile_blocked_profiles b
            JOIN profiles p ON p.id = b.from_profile_id
            WHERE b.to_profile_id = $1
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(blocked_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn is_blocked(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("is_profile_blocked");
        let result: Result<(bool,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM profile_blocked_profiles
                WHERE from_profile_id = $1 AND to_profile_id = $2
            )
            "#,
        )
        .bind(blocker_id)
        .bind(blocked_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.0)
    }
}
