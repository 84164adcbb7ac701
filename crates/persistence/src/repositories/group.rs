//! Group repository for database operations.

use async_trait::async_trait;
use domain::models::{Group, Profile};
use domain::repositories::GroupRepository;
use domain::{DomainError, DomainResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GenderDb, GroupEntity, ProfileEntity};
use crate::error::{db_err, to_int4};
use crate::metrics::QueryTimer;

/// Repository for groups and their memberships.
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn insert(&self, group: &Group) -> DomainResult<Group> {
        let total_members = group
            .total_members
            .map(|v| to_int4(v, "total_members"))
            .transpose()?;
        let timer = QueryTimer::new("insert_group");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            INSERT INTO groups (id, owner_id, gender, total_members, share_link, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, gender, total_members, share_link, created_at
            "#,
        )
        .bind(group.id)
        .bind(group.owner_id)
        .bind(GenderDb::from(group.gender))
        .bind(total_members)
        .bind(&group.share_link)
        .bind(group.created_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.into())
    }

    /// A stored share link wins over the incoming one.
    async fn update(&self, group: &Group) -> DomainResult<Group> {
        let total_members = group
            .total_members
            .map(|v| to_int4(v, "total_members"))
            .transpose()?;
        let timer = QueryTimer::new("update_group");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            UPDATE groups
            SET gender = $2,
                total_members = $3,
                share_link = COALESCE(share_link, $4)
            WHERE id = $1
            RETURNING id, owner_id, gender, total_members, share_link, created_at
            "#,
        )
        .bind(group.id)
        .bind(GenderDb::from(group.gender))
        .bind(total_members)
        .bind(&group.share_link)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
            .map_err(db_err)?
            .map(Into::into)
            .ok_or_else(|| DomainError::NotFound(format!("group {} not found", group.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Group>> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, owner_id, gender, total_members, share_link, created_at
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.map(Into::into))
    }

    async fn find_by_share_link(&self, share_link: &str) -> DomainResult<Option<Group>> {
        let timer = QueryTimer::new("find_group_by_share_link");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, owner_id, gender, total_members, share_link, created_at
            FROM groups
            WHERE share_link = $1
            "#,
        )
        .bind(share_link)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.map(Into::into))
    }

    async fn share_link_exists(&self, share_link: &str) -> DomainResult<bool> {
        let timer = QueryTimer::new("share_link_exists");
        let result: Result<(bool,), sqlx::Error> =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM groups WHERE share_link = $1)")
                .bind(share_link)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        Ok(result.map_err(db_err)?.0)
    }

    async fn list_owned_by(&self, owner_id: Uuid) -> DomainResult<Vec<Group>> {
        let timer = QueryTimer::new("list_groups_owned_by");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, owner_id, gender, total_members, share_link, created_at
            FROM groups
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list_for_member(&self, profile_id: Uuid) -> DomainResult<Vec<Group>> {
        let timer = QueryTimer::new("list_groups_for_member");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT g.id, g.owner_id, g.gender, g.total_members, g.share_link, g.created_at
            FROM group_members gm
            JOIN groups g ON g.id = gm.group_id
            WHERE gm.profile_id = $1
            ORDER BY g.created_at, g.id
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

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("delete_group");
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected() > 0)
    }

    async fn add_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("add_group_member");
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, profile_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, profile_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(profile_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected() > 0)
    }

    async fn remove_member(&self, group_id: Uuid, profile_id: Uuid) -> DomainResult<bool> {
        let timer = QueryTimer::new("remove_group_member");
        let result =
            sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND profile_id = $2")
                .bind(group_id)
                .bind(profile_id)
                .execute(&self.pool)
                .await;
        timer.record();
        Ok(result.map_err(db_err)?.rows_affected() > 0)
    }

    async fn list_members(&self, group_id: Uuid) -> DomainResult<Vec<Profile>> {
        let timer = QueryTimer::new("list_group_members");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT p.id, p.email, p.password_hash, p.firstname, p.lastname, p.is_staff,
                   p.is_active, p.created_at, p.has_account, p.birthdate, p.age,
                   p.nationality, p.city, p.university, p.description, p.gender, p.show_me
            FROM group_members gm
            JOIN profiles p ON p.id = gm.profile_id
            WHERE gm.group_id = $1
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn count_members(&self, group_id: Uuid) -> DomainResult<i64> {
        let timer = QueryTimer::new("count_group_members");
        let result: Result<(i64,), sqlx::Error> =
            sqlx::query_as("SELECT COUNT(*) FROM group_members WHERE group_id = $1")
                .bind(group_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        Ok(result.map_err(db_err)?.0)
    }
}
