//! Domain services for Toogether.
//!
//! Services apply the data-model rules on top of the repository and storage
//! ports. They hold their collaborators behind `Arc<dyn ...>` so the same
//! code runs against PostgreSQL or the in-memory store.

pub mod auth;
pub mod group;
pub mod like;
pub mod photo;
pub mod profile;

pub use auth::AuthService;
pub use group::{GroupService, SHARE_LINK_MAX_ATTEMPTS};
pub use like::LikeService;
pub use photo::PhotoService;
pub use profile::ProfileService;
