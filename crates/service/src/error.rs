//! Startup failures.

use domain::DomainError;
use shared::jwt::JwtError;
use thiserror::Error;

use crate::config::ConfigValidationError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    #[error("Signing key error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Metrics exporter error: {0}")]
    Metrics(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
