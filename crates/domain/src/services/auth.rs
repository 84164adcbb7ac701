//! Login, token refresh with rotation, logout and access-token checks.

use chrono::Utc;
use shared::crypto::sha256_hex;
use shared::jwt::{extract_user_id, Claims, JwtConfig};
use shared::password::verify_password;
use shared::validation::normalize_email;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::{AuthTokens, BlacklistedToken, Profile};
use crate::repositories::{ProfileRepository, TokenBlacklistRepository};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Issues and rotates access/refresh token pairs.
///
/// Refresh tokens are single use: presenting one to [`AuthService::refresh`]
/// blacklists it by the SHA-256 of its `jti`.
#[derive(Clone)]
pub struct AuthService {
    profiles: Arc<dyn ProfileRepository>,
    blacklist: Arc<dyn TokenBlacklistRepository>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        blacklist: Arc<dyn TokenBlacklistRepository>,
        jwt: JwtConfig,
    ) -> Self {
        Self {
            profiles,
            blacklist,
            jwt,
        }
    }

    /// Checks email and password and issues a fresh token pair.
    ///
    /// Unknown email, wrong password and inactive profile all fail with the
    /// same `Unauthorized` error.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<AuthTokens> {
        let email = normalize_email(email);
        let profile = match self.profiles.find_by_email(&email).await? {
            Some(profile) => profile,
            None => {
                info!("Login attempt for unknown email");
                return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(password, &profile.password_hash)? || !profile.can_authenticate() {
            info!(profile_id = %profile.id, "Login rejected");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let tokens = self.issue_tokens(profile.id)?;
        info!(profile_id = %profile.id, "Profile authenticated");
        Ok(tokens)
    }

    /// Exchanges a refresh token for a new pair and blacklists the old one.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthTokens> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;
        let profile = self.active_profile(&claims).await?;

        let jti_hash = sha256_hex(&claims.jti);
        if self.blacklist.contains(&jti_hash).await? {
            warn!(profile_id = %profile.id, "Blacklisted refresh token presented");
            return Err(DomainError::Unauthorized(
                "refresh token has been revoked".to_string(),
            ));
        }

        if !self.blacklist.insert(&blacklist_entry(jti_hash, &profile, &claims)).await? {
            warn!(profile_id = %profile.id, "Refresh token used concurrently");
            return Err(DomainError::Unauthorized(
                "refresh token has been revoked".to_string(),
            ));
        }

        let tokens = self.issue_tokens(profile.id)?;
        info!(profile_id = %profile.id, "Tokens rotated");
        Ok(tokens)
    }

    /// Revokes a refresh token. Revoking an already revoked token succeeds.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;
        let profile_id = extract_user_id(&claims)?;

        let Some(profile) = self.profiles.find_by_id(profile_id).await? else {
            return Ok(());
        };

        let entry = blacklist_entry(sha256_hex(&claims.jti), &profile, &claims);
        self.blacklist.insert(&entry).await?;
        info!(profile_id = %profile.id, "Refresh token revoked");
        Ok(())
    }

    /// Validates an access token and returns the profile it belongs to.
    pub async fn verify_access(&self, access_token: &str) -> DomainResult<Uuid> {
        let claims = self.jwt.validate_access_token(access_token)?;
        Ok(self.active_profile(&claims).await?.id)
    }

    /// Removes blacklist rows whose tokens would be rejected as expired anyway.
    pub async fn purge_expired_tokens(&self) -> DomainResult<u64> {
        let purged = self.blacklist.purge_expired(Utc::now()).await?;
        if purged > 0 {
            info!(purged, "Purged expired blacklisted tokens");
        }
        Ok(purged)
    }

    fn issue_tokens(&self, profile_id: Uuid) -> DomainResult<AuthTokens> {
        let access = self.jwt.generate_access_token(profile_id)?;
        let refresh = self.jwt.generate_refresh_token(profile_id)?;

        Ok(AuthTokens {
            profile_id,
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    async fn active_profile(&self, claims: &Claims) -> DomainResult<Profile> {
        let profile_id = extract_user_id(claims)?;
        match self.profiles.find_by_id(profile_id).await? {
            Some(profile) if profile.can_authenticate() => Ok(profile),
            _ => Err(DomainError::Unauthorized(
                "token does not belong to an active profile".to_string(),
            )),
        }
    }
}

fn blacklist_entry(jti_hash: String, profile: &Profile, claims: &Claims) -> BlacklistedToken {
    BlacklistedToken {
        jti_hash,
        profile_id: profile.id,
        expires_at: claims.expires_at(),
        blacklisted_at: crate::models::timestamp_now(),
    }
}
