//! Persistence layer for the Toogether backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain repository ports
//! - Local filesystem blob storage

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod storage;

pub use db::{create_pool, DatabaseConfig, MIGRATOR};
pub use repositories::{
    PgGroupRepository, PgLikeRepository, PgPhotoRepository, PgProfileRepository,
    PgTokenBlacklistRepository,
};
pub use storage::LocalBlobStorage;
