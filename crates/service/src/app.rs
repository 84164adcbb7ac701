//! Service container wiring repositories, storage and signing keys together.

use std::sync::Arc;

use domain::repositories::{
    GroupRepository, InMemoryStore, LikeRepository, PhotoRepository, ProfileRepository,
    TokenBlacklistRepository,
};
use domain::services::{AuthService, GroupService, LikeService, PhotoService, ProfileService};
use domain::storage::{BlobStorage, InMemoryBlobStorage};
use metrics_exporter_prometheus::PrometheusBuilder;
use persistence::{
    LocalBlobStorage, PgGroupRepository, PgLikeRepository, PgPhotoRepository,
    PgProfileRepository, PgTokenBlacklistRepository,
};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::net::SocketAddr;
use tracing::info;

use crate::config::{Config, StorageBackend, StorageConfig};
use crate::error::StartupError;

/// One implementation of every repository port.
#[derive(Clone)]
pub struct Repositories {
    pub profiles: Arc<dyn ProfileRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub blacklist: Arc<dyn TokenBlacklistRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            photos: Arc::new(PgPhotoRepository::new(pool.clone())),
            groups: Arc::new(PgGroupRepository::new(pool.clone())),
            likes: Arc::new(PgLikeRepository::new(pool.clone())),
            blacklist: Arc::new(PgTokenBlacklistRepository::new(pool)),
        }
    }

    /// Every port backed by the same in-memory store.
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            profiles: store.clone(),
            photos: store.clone(),
            groups: store.clone(),
            likes: store.clone(),
            blacklist: store,
        }
    }
}

/// The services a request handler works with.
#[derive(Clone)]
pub struct AppServices {
    pub profiles: ProfileService,
    pub auth: AuthService,
    pub photos: PhotoService,
    pub groups: GroupService,
    pub likes: LikeService,
}

impl AppServices {
    pub fn new(repos: Repositories, storage: Arc<dyn BlobStorage>, jwt: JwtConfig) -> Self {
        Self {
            profiles: ProfileService::new(repos.profiles.clone()),
            auth: AuthService::new(repos.profiles.clone(), repos.blacklist, jwt),
            photos: PhotoService::new(repos.profiles.clone(), repos.photos, storage),
            groups: GroupService::new(repos.profiles.clone(), repos.groups),
            likes: LikeService::new(repos.profiles, repos.likes),
        }
    }

    pub fn from_postgres(pool: PgPool, storage: Arc<dyn BlobStorage>, jwt: JwtConfig) -> Self {
        Self::new(Repositories::postgres(pool), storage, jwt)
    }

    /// Fully in-memory wiring, for tests and local experiments.
    pub fn in_memory(jwt: JwtConfig) -> Self {
        Self::new(
            Repositories::in_memory(InMemoryStore::new()),
            Arc::new(InMemoryBlobStorage::default()),
            jwt,
        )
    }
}

/// Builds the configured blob storage backend.
pub fn build_storage(config: &StorageConfig) -> Arc<dyn BlobStorage> {
    match config.backend {
        StorageBackend::Local => Arc::new(LocalBlobStorage::new(
            config.media_root.clone(),
            config.base_url.clone(),
        )),
        StorageBackend::Memory => Arc::new(InMemoryBlobStorage::new(config.base_url.clone())),
    }
}

/// Installs the Prometheus recorder with a scrape listener on `addr`.
pub fn install_metrics_exporter(addr: SocketAddr) -> Result<(), StartupError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| StartupError::Metrics(e.to_string()))?;
    info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Connects, migrates and wires the PostgreSQL-backed services.
pub async fn bootstrap(config: &Config) -> Result<AppServices, StartupError> {
    let pool = persistence::create_pool(&(&config.database).into()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");
    persistence::metrics::record_pool_metrics(&pool);

    Ok(AppServices::from_postgres(
        pool,
        build_storage(&config.storage),
        config.jwt_config()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::photo::storage_key;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_local_storage_backend_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Local,
            media_root: dir.path().to_path_buf(),
            base_url: "/".to_string(),
            bucket: "toogether-images".to_string(),
        };

        let storage = build_storage(&config);
        let key = storage_key(Uuid::nil(), Uuid::nil(), "jpg");
        storage.put(&key, b"bytes").await.unwrap();

        assert!(dir.path().join(&key).is_file());
        assert!(storage.url(&key).starts_with("/images/"));
    }
}
