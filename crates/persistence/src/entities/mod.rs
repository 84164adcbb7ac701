//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod group;
pub mod like;
pub mod photo;
pub mod profile;
pub mod token;

pub use group::GroupEntity;
pub use like::LikeEntity;
pub use photo::PhotoEntity;
pub use profile::{GenderDb, ProfileEntity, ShowMeDb};
pub use token::BlacklistedTokenEntity;
