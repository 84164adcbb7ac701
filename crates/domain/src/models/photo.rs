//! Photo domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// File extensions accepted for uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "heic"];

/// An image owned by exactly one profile.
///
/// `image` is the storage key of the uploaded bytes; the bytes themselves
/// live in the blob storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Photo {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(profile_id: Uuid, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            image,
            created_at: super::timestamp_now(),
        }
    }
}

/// Lower-cases an extension and checks it against [`ALLOWED_EXTENSIONS`].
pub fn normalize_extension(extension: &str) -> Option<String> {
    let normalized = extension.trim().trim_start_matches('.').to_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&normalized.as_str())
        .then_some(normalized)
}

/// Storage key for a photo: `images/<profile_id>/<photo_id>.<ext>`.
pub fn storage_key(profile_id: Uuid, photo_id: Uuid, extension: &str) -> String {
    format!("images/{}/{}.{}", profile_id, photo_id, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("JPG"), Some("jpg".to_string()));
        assert_eq!(normalize_extension(".png"), Some("png".to_string()));
        assert_eq!(normalize_extension("exe"), None);
        assert_eq!(normalize_extension(""), None);
    }

    #[test]
    fn test_storage_key_layout() {
        let profile_id = Uuid::nil();
        let photo_id = Uuid::from_u128(1);
        assert_eq!(
            storage_key(profile_id, photo_id, "webp"),
            "images/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-000000000001.webp"
        );
    }

    #[test]
    fn test_new_photo() {
        let owner = Uuid::new_v4();
        let photo = Photo::new(owner, Some("images/a.png".to_string()));
        assert_eq!(photo.profile_id, owner);
        assert_ne!(photo.id, owner);
    }
}
