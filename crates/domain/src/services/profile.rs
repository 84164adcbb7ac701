//! Profile registration, edits, lifecycle and blocking.

use chrono::Utc;
use shared::pagination::{clamp_page_size, decode_cursor, encode_cursor, Page};
use shared::password::{check_password_policy, hash_password};
use shared::validation::{normalize_email, validate_email_address};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{DomainError, DomainResult};
use crate::models::{Profile, RegisterProfileRequest, UpdateProfileRequest};
use crate::repositories::ProfileRepository;

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Registers a new profile.
    ///
    /// The email is lower-cased before the uniqueness check, so addresses
    /// differing only in case collide with `Conflict`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterProfileRequest) -> DomainResult<Profile> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        validate_email_address(&request.email)?;
        check_password_policy(&request.password, &request.email)?;

        if self.profiles.find_by_email(&request.email).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "email {} is already registered",
                request.email
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let mut profile = Profile::new(request.email, password_hash);
        profile.firstname = request.firstname;
        profile.lastname = request.lastname;

        let profile = self.profiles.insert(&profile).await?;
        info!(profile_id = %profile.id, "Profile registered");
        Ok(profile)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Profile> {
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("profile {} not found", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> DomainResult<Option<Profile>> {
        self.profiles.find_by_email(&normalize_email(email)).await
    }

    /// Applies a partial edit. A new birthdate re-derives `age`.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: UpdateProfileRequest) -> DomainResult<Profile> {
        changes.validate()?;

        let mut profile = self.get(id).await?;
        changes.apply_to(&mut profile, Utc::now().date_naive());

        self.profiles.update(&profile).await
    }

    /// Marks the profile as having finished onboarding.
    pub async fn complete_account(&self, id: Uuid) -> DomainResult<Profile> {
        let mut profile = self.get(id).await?;
        if profile.has_account {
            return Ok(profile);
        }
        profile.has_account = true;
        self.profiles.update(&profile).await
    }

    /// Soft-retires a profile. It can no longer authenticate.
    pub async fn deactivate(&self, id: Uuid) -> DomainResult<Profile> {
        self.set_active(id, false).await
    }

    pub async fn reactivate(&self, id: Uuid) -> DomainResult<Profile> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DomainResult<Profile> {
        let mut profile = self.get(id).await?;
        if profile.is_active == is_active {
            return Ok(profile);
        }
        profile.is_active = is_active;
        let profile = self.profiles.update(&profile).await?;
        info!(profile_id = %id, is_active, "Profile activity changed");
        Ok(profile)
    }

    /// Hard-deletes a profile with its photos, owned groups, memberships and
    /// block edges. Likes referencing it are detached.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.profiles.delete(id).await? {
            return Err(DomainError::NotFound(format!("profile {} not found", id)));
        }
        info!(profile_id = %id, "Profile deleted");
        Ok(())
    }

    /// Lists profiles in creation order.
    pub async fn list(&self, cursor: Option<&str>, limit: Option<i64>) -> DomainResult<Page<Profile>> {
        let after = cursor.map(decode_cursor).transpose()?;
        let limit = clamp_page_size(limit);

        let mut items = self.profiles.list(after, limit + 1).await?;
        let has_more = items.len() as i64 > limit;
        items.truncate(limit as usize);

        let next_cursor = if has_more {
            items.last().map(|p| encode_cursor(p.created_at, p.id))
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }

    /// Adds `blocker -> blocked`. Blocking someone already blocked is a no-op.
    #[instrument(skip(self))]
    pub async fn block(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<()> {
        if blocker_id == blocked_id {
            return Err(DomainError::Validation(
                "a profile cannot block itself".to_string(),
            ));
        }
        self.get(blocker_id).await?;
        self.get(blocked_id).await?;

        if self.profiles.add_block(blocker_id, blocked_id).await? {
            info!(%blocker_id, %blocked_id, "Profile blocked");
        }
        Ok(())
    }

    /// Removes `blocker -> blocked`. A missing edge between existing profiles
    /// is a no-op.
    pub async fn unblock(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<()> {
        self.get(blocker_id).await?;
        self.get(blocked_id).await?;

        if self.profiles.remove_block(blocker_id, blocked_id).await? {
            info!(%blocker_id, %blocked_id, "Profile unblocked");
        }
        Ok(())
    }

    /// Profiles that `id` has blocked.
    pub async fn blocked_profiles(&self, id: Uuid) -> DomainResult<Vec<Profile>> {
        self.get(id).await?;
        self.profiles.list_blocked(id).await
    }

    /// Profiles that have blocked `id`.
    pub async fn blocked_by(&self, id: Uuid) -> DomainResult<Vec<Profile>> {
        self.get(id).await?;
        self.profiles.list_blockers(id).await
    }

    pub async fn is_blocked(&self, blocker_id: Uuid, blocked_id: Uuid) -> DomainResult<bool> {
        self.get(blocker_id).await?;
        self.get(blocked_id).await?;
        self.profiles.is_blocked(blocker_id, blocked_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::repositories::InMemoryStore;
    use chrono::NaiveDate;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    const PASSWORD: &str = "Night-Out-2024!";

    fn service() -> ProfileService {
        ProfileService::new(Arc::new(InMemoryStore::new()))
    }

    fn request(email: &str) -> RegisterProfileRequest {
        RegisterProfileRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            firstname: None,
            lastname: None,
        }
    }

    async fn register(service: &ProfileService) -> Profile {
        let email: String = SafeEmail().fake();
        service.register(request(&email)).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_hashes_and_lowercases() {
        let service = service();
        let profile = service.register(request("  Ada@Example.COM ")).await.unwrap();

        assert_eq!(profile.email, "ada@example.com");
        assert!(profile.password_hash.starts_with("$argon2id$"));
        assert!(profile.is_active);
        assert!(!profile.has_account);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_any_case() {
        let service = service();
        service.register(request("ada@example.com")).await.unwrap();

        let err = service
            .register(request("ADA@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let service = service();
        let err = service.register(request("not-an-email")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut weak = request("ada@example.com");
        weak.password = "12345678".to_string();
        let err = service.register(weak).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_derives_age_and_rejects_future_birthdate() {
        let service = service();
        let profile = register(&service).await;

        let updated = service
            .update(
                profile.id,
                UpdateProfileRequest {
                    birthdate: NaiveDate::from_ymd_opt(1990, 1, 1),
                    gender: Some(Gender::NonBinary),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.age.unwrap() >= 30);
        assert_eq!(updated.gender, Gender::NonBinary);

        let err = service
            .update(
                profile.id,
                UpdateProfileRequest {
                    birthdate: Some(Utc::now().date_naive() + chrono::Duration::days(30)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_lifecycle_flags() {
        let service = service();
        let profile = register(&service).await;

        assert!(service.complete_account(profile.id).await.unwrap().has_account);
        assert!(!service.deactivate(profile.id).await.unwrap().is_active);
        assert!(service.reactivate(profile.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_blocking_is_asymmetric() {
        let service = service();
        let a = register(&service).await;
        let b = register(&service).await;

        service.block(a.id, b.id).await.unwrap();
        service.block(a.id, b.id).await.unwrap();

        assert!(service.is_blocked(a.id, b.id).await.unwrap());
        assert!(!service.is_blocked(b.id, a.id).await.unwrap());
        assert_eq!(service.blocked_profiles(a.id).await.unwrap().len(), 1);
        assert!(service.blocked_profiles(b.id).await.unwrap().is_empty());
        assert_eq!(service.blocked_by(b.id).await.unwrap()[0].id, a.id);

        service.unblock(a.id, b.id).await.unwrap();
        assert!(!service.is_blocked(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_block_rejects_self_and_unknown() {
        let service = service();
        let a = register(&service).await;

        let err = service.block(a.id, a.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service.block(a.id, Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_pages_through_everything() {
        let service = service();
        for _ in 0..5 {
            register(&service).await;
        }

        let first = service.list(None, Some(2)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let cursor = first.next_cursor.clone().unwrap();

        let second = service.list(Some(&cursor), Some(2)).await.unwrap();
        let third = service
            .list(second.next_cursor.as_deref(), Some(2))
            .await
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.next_cursor.is_none());

        let mut seen: Vec<Uuid> = [first.items, second.items, third.items]
            .into_iter()
            .flatten()
            .map(|p| p.id)
            .collect();
        assert_eq!(seen.len(), 5);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5, "a page repeated a profile");

        let err = service.list(Some("garbage!"), None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_resumes_after_sub_microsecond_timestamps() {
        let store = Arc::new(InMemoryStore::new());
        let service = ProfileService::new(store.clone());
        let base = Utc::now();
        for i in 0..3 {
            let mut profile = Profile::new(format!("p{}@x.com", i), "hash".to_string());
            profile.created_at = base + chrono::Duration::nanoseconds(100 * i);
            ProfileRepository::insert(store.as_ref(), &profile).await.unwrap();
        }

        let first = service.list(None, Some(2)).await.unwrap();
        let second = service
            .list(first.next_cursor.as_deref(), Some(2))
            .await
            .unwrap();

        let emails: Vec<_> = second.items.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails, vec!["p2@x.com"]);
    }

    #[test]
    fn test_new_profiles_are_stamped_at_microseconds() {
        let profile = Profile::new("a@x.com".to_string(), "hash".to_string());
        assert_eq!(profile.created_at.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[tokio::test]
    async fn test_block_queries_reject_unknown_profiles() {
        let service = service();
        let a = register(&service).await;
        let b = register(&service).await;
        let ghost = Uuid::new_v4();

        assert!(service.unblock(a.id, ghost).await.unwrap_err().is_not_found());
        assert!(service.unblock(ghost, a.id).await.unwrap_err().is_not_found());
        assert!(service.is_blocked(a.id, ghost).await.unwrap_err().is_not_found());
        assert!(service.is_blocked(ghost, a.id).await.unwrap_err().is_not_found());

        // No edge between two real profiles is simply a no-op.
        service.unblock(a.id, b.id).await.unwrap();
        assert!(!service.is_blocked(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_profile() {
        let service = service();
        assert!(service.delete(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }
}
