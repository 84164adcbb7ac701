//! Environment-selected HTTP policy values.
//!
//! Only the values live here; enforcing them is left to whatever HTTP layer
//! fronts the service.

use serde::Serialize;

pub const PRODUCTION_HOST: &str = "mobile-api.toogether.app";
pub const PRODUCTION_API_ORIGIN: &str = "https://mobile-api.toogether.app";
pub const PRODUCTION_APP_ORIGIN: &str = "https://toogether.app";

/// Hosts, CSRF and CORS settings for one deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpPolicy {
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub csrf_trusted_origins: Vec<String>,
    pub cors_allow_all: bool,
    pub cors_allow_credentials: bool,
    pub cors_origin_whitelist: Vec<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl HttpPolicy {
    pub fn for_environment(production: bool) -> Self {
        if production {
            Self::production()
        } else {
            Self::local()
        }
    }

    /// Strict values for the public deployment.
    pub fn production() -> Self {
        Self {
            debug: false,
            allowed_hosts: vec![PRODUCTION_HOST.to_string()],
            csrf_trusted_origins: vec![PRODUCTION_API_ORIGIN.to_string()],
            cors_allow_all: false,
            cors_allow_credentials: true,
            cors_origin_whitelist: vec![PRODUCTION_API_ORIGIN.to_string()],
            cors_allowed_origins: vec![
                PRODUCTION_APP_ORIGIN.to_string(),
                PRODUCTION_API_ORIGIN.to_string(),
            ],
        }
    }

    /// Permissive values for local development.
    pub fn local() -> Self {
        Self {
            debug: true,
            allowed_hosts: vec!["*".to_string(), "127.0.0.1".to_string()],
            csrf_trusted_origins: Vec::new(),
            cors_allow_all: true,
            cors_allow_credentials: true,
            cors_origin_whitelist: Vec::new(),
            cors_allowed_origins: Vec::new(),
        }
    }

    /// Whether a cross-origin request from `origin` would be accepted.
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.cors_allow_all
            || self.cors_allowed_origins.iter().any(|o| o == origin)
            || self.cors_origin_whitelist.iter().any(|o| o == origin)
    }

    /// Whether `host` matches `allowed_hosts`; `*` matches anything.
    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed_hosts
            .iter()
            .any(|allowed| allowed == "*" || allowed.eq_ignore_ascii_case(host))
    }
}
