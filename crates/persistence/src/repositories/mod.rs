//! PostgreSQL implementations of the domain repository ports.

pub mod group;
pub mod like;
pub mod photo;
pub mod profile;
pub mod token_blacklist;

pub use group::PgGroupRepository;
pub use like::PgLikeRepository;
pub use photo::PgPhotoRepository;
pub use profile::PgProfileRepository;
pub use token_blacklist::PgTokenBlacklistRepository;
