//! End-to-end data model scenarios over the in-memory wiring.

use std::sync::Arc;

use domain::models::group::is_share_link;
use domain::models::{CreateGroupRequest, Gender, RegisterProfileRequest};
use domain::repositories::InMemoryStore;
use domain::storage::{BlobStorage, InMemoryBlobStorage};
use domain::DomainError;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use shared::jwt::JwtConfig;
use toogether_service::app::{AppServices, Repositories};
use toogether_service::config::Config;

const PASSWORD: &str = "Night-Out-2024!";

fn jwt() -> JwtConfig {
    let config = Config::load_for_test(&[("jwt.secret", "data-model-test-secret")])
        .expect("test config");
    config.jwt_config().expect("jwt config")
}

fn services() -> AppServices {
    AppServices::in_memory(jwt())
}

async fn register(services: &AppServices, email: &str) -> domain::models::Profile {
    services
        .profiles
        .register(RegisterProfileRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            firstname: None,
            lastname: None,
        })
        .await
        .expect("register")
}

async fn register_random(services: &AppServices) -> domain::models::Profile {
    let email: String = SafeEmail().fake();
    register(services, &email).await
}

#[tokio::test]
async fn duplicate_email_is_rejected_regardless_of_case() {
    let services = services();
    register(&services, "lea@example.com").await;

    let err = services
        .profiles
        .register(RegisterProfileRequest {
            email: "Lea@Example.COM".to_string(),
            password: PASSWORD.to_string(),
            firstname: None,
            lastname: None,
        })
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "{err:?}");
}

#[tokio::test]
async fn share_link_is_assigned_once_and_well_formed() {
    let services = services();
    let owner = register_random(&services).await;

    let group = services
        .groups
        .create(
            owner.id,
            CreateGroupRequest {
                gender: Some(Gender::Female),
                total_members: Some(4),
            },
        )
        .await
        .unwrap();
    let link = group.share_link.clone().expect("link assigned on create");
    assert!(link.starts_with("https://start.the.night/"));
    assert!(is_share_link(&link));

    let mut edited = group.clone();
    edited.total_members = Some(6);
    let saved = services.groups.save(edited).await.unwrap();
    assert_eq!(saved.share_link.as_deref(), Some(link.as_str()));
    assert_eq!(saved.total_members, Some(6));

    let found = services.groups.find_by_share_link(&link).await.unwrap();
    assert_eq!(found.id, group.id);
}

#[tokio::test]
async fn blocking_is_directional() {
    let services = services();
    let a = register_random(&services).await;
    let b = register_random(&services).await;

    services.profiles.block(a.id, b.id).await.unwrap();
    services.profiles.block(a.id, b.id).await.unwrap();

    assert!(services.profiles.is_blocked(a.id, b.id).await.unwrap());
    assert!(!services.profiles.is_blocked(b.id, a.id).await.unwrap());

    let blocked: Vec<_> = services
        .profiles
        .blocked_profiles(a.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(blocked, vec![b.id]);
    assert!(services.profiles.blocked_profiles(b.id).await.unwrap().is_empty());

    let err = services.profiles.block(a.id, a.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn deleting_a_profile_cascades_and_detaches_likes() {
    let store = InMemoryStore::new();
    let blobs = Arc::new(InMemoryBlobStorage::default());
    let services = AppServices::new(Repositories::in_memory(store), blobs.clone(), jwt());

    let owner = register_random(&services).await;
    let friend = register_random(&services).await;

    let group = services
        .groups
        .create(owner.id, CreateGroupRequest::default())
        .await
        .unwrap();
    services.groups.add_member(group.id, friend.id).await.unwrap();
    services.profiles.block(friend.id, owner.id).await.unwrap();
    let photo = services
        .photos
        .upload(owner.id, b"\xff\xd8\xff jpeg bytes", "jpg")
        .await
        .unwrap();
    let like = services.likes.record(owner.id).await.unwrap();

    services.profiles.delete(owner.id).await.unwrap();

    assert!(services.profiles.get(owner.id).await.unwrap_err().is_not_found());
    assert!(services.groups.get(group.id).await.unwrap_err().is_not_found());
    assert!(services.photos.get(photo.id).await.unwrap_err().is_not_found());
    assert!(services
        .groups
        .groups_for_member(friend.id)
        .await
        .unwrap()
        .is_empty());
    assert!(services.profiles.blocked_profiles(friend.id).await.unwrap().is_empty());

    let like = services.likes.get(like.id).await.unwrap();
    assert!(like.is_detached());

    // The friend is untouched.
    assert!(services.profiles.get(friend.id).await.is_ok());
}

#[tokio::test]
async fn refresh_rotation_blacklists_the_used_token() {
    let services = services();
    let profile = register(&services, "rotate@example.com").await;

    let first = services
        .auth
        .authenticate("ROTATE@example.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(first.profile_id, profile.id);

    let second = services.auth.refresh(&first.refresh_token).await.unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);

    let reuse = services.auth.refresh(&first.refresh_token).await.unwrap_err();
    assert!(matches!(reuse, DomainError::Unauthorized(_)), "{reuse:?}");

    assert_eq!(
        services.auth.verify_access(&second.access_token).await.unwrap(),
        profile.id
    );

    services.auth.logout(&second.refresh_token).await.unwrap();
    assert!(services.auth.refresh(&second.refresh_token).await.is_err());
}

#[tokio::test]
async fn photo_bytes_follow_the_photo_lifecycle() {
    let blobs = Arc::new(InMemoryBlobStorage::default());
    let services = AppServices::new(
        Repositories::in_memory(InMemoryStore::new()),
        blobs.clone(),
        jwt(),
    );
    let profile = register_random(&services).await;

    let photo = services
        .photos
        .upload(profile.id, b"png bytes", "PNG")
        .await
        .unwrap();
    let key = photo.image.clone().expect("stored key");
    assert_eq!(key, format!("images/{}/{}.png", profile.id, photo.id));
    assert_eq!(blobs.open(&key).await.unwrap(), b"png bytes");
    assert_eq!(
        services.photos.url(&photo).as_deref(),
        Some(format!("/images/{}/{}.png", profile.id, photo.id).as_str())
    );

    services.photos.delete(photo.id).await.unwrap();
    assert!(!blobs.exists(&key).await.unwrap());
    assert!(blobs.is_empty().await);

    let unknown = services
        .photos
        .upload(uuid::Uuid::new_v4(), b"bytes", "jpg")
        .await
        .unwrap_err();
    assert!(unknown.is_not_found());
    assert!(blobs.is_empty().await);
}
