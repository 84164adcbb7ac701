use serde::Deserialize;
use shared::jwt::{
    JwtConfig, JwtError, DEFAULT_ACCESS_TOKEN_LIFETIME_SECS, DEFAULT_REFRESH_TOKEN_LIFETIME_SECS,
};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::security::HttpPolicy;

/// Signing secret used when no secret is configured outside production.
pub const DEVELOPMENT_SECRET: &str = "toogether-insecure-development-secret";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub jwt: JwtSettings,
    pub storage: StorageConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Selects the strict HTTP policy and requires a real signing secret.
    #[serde(default)]
    pub production: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Clone, Deserialize)]
pub struct JwtSettings {
    /// HS256 signing secret. Empty means "use the development secret".
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,

    #[serde(default)]
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[REDACTED]")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files below `media_root`.
    Local,
    /// Process memory; contents vanish on exit.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// Prefix of public photo URLs.
    #[serde(default = "default_media_base_url")]
    pub base_url: String,

    /// Object storage bucket for an external S3 backend.
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Address of the Prometheus scrape listener; unset disables it.
    #[serde(default)]
    pub listen_addr: Option<String>,
}

// Default value functions
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_access_token_expiry() -> i64 {
    DEFAULT_ACCESS_TOKEN_LIFETIME_SECS
}
fn default_refresh_token_expiry() -> i64 {
    DEFAULT_REFRESH_TOKEN_LIFETIME_SECS
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Local
}
fn default_media_root() -> PathBuf {
    PathBuf::from("static")
}
fn default_media_base_url() -> String {
    "/".to_string()
}
fn default_bucket() -> String {
    "toogether-images".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with TG__ prefix
    /// 4. A bare `PRODUCTION` variable forces `server.production = true`
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TG").separator("__"))
            .set_override_option(
                "server.production",
                std::env::var_os("PRODUCTION").map(|_| true),
            )?
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a config from embedded defaults plus `overrides`, without
    /// touching the file system or environment. Not validated.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            production = false

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [jwt]
            secret = ""
            access_token_expiry_secs = 2592000
            refresh_token_expiry_secs = 7776000
            leeway_secs = 0

            [storage]
            backend = "memory"
            media_root = "static"
            base_url = "/"
            bucket = "toogether-images"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "TG__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.server.production && self.jwt.secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "TG__JWT__SECRET must be set in production".to_string(),
            ));
        }

        if self.jwt.access_token_expiry_secs <= 0 || self.jwt.refresh_token_expiry_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "token lifetimes must be positive".to_string(),
            ));
        }

        if self.storage.bucket.is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "storage bucket cannot be empty".to_string(),
            ));
        }

        self.metrics_addr()?;
        Ok(())
    }

    /// The configured secret, or the development secret outside production.
    pub fn signing_secret(&self) -> &str {
        if self.jwt.secret.is_empty() && !self.server.production {
            DEVELOPMENT_SECRET
        } else {
            &self.jwt.secret
        }
    }

    pub fn jwt_config(&self) -> Result<JwtConfig, JwtError> {
        JwtConfig::new(
            self.signing_secret(),
            self.jwt.access_token_expiry_secs,
            self.jwt.refresh_token_expiry_secs,
            self.jwt.leeway_secs,
        )
    }

    pub fn http_policy(&self) -> HttpPolicy {
        HttpPolicy::for_environment(self.server.production)
    }

    pub fn metrics_addr(&self) -> Result<Option<SocketAddr>, ConfigValidationError> {
        self.metrics
            .listen_addr
            .as_deref()
            .filter(|addr| !addr.is_empty())
            .map(|addr| {
                addr.parse().map_err(|_| {
                    ConfigValidationError::InvalidValue(format!(
                        "metrics.listen_addr is not a socket address: {}",
                        addr
                    ))
                })
            })
            .transpose()
    }
}
