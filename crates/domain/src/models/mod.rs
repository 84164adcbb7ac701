//! Domain models for Toogether.

pub mod auth;
pub mod group;
pub mod like;
pub mod photo;
pub mod profile;

use chrono::{DateTime, SubsecRound, Utc};

pub use auth::{AuthTokens, BlacklistedToken};
pub use group::{CreateGroupRequest, Group};
pub use like::Like;
pub use photo::Photo;
pub use profile::{Gender, Profile, RegisterProfileRequest, ShowMe, UpdateProfileRequest};

/// The current time at the microsecond precision PostgreSQL stores.
///
/// Every `created_at` is stamped through this so in-memory and stored rows
/// order and compare identically, cursors included.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
