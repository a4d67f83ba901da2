use chrono::{DateTime, Utc};
use rulehub_entities::types::MediaStatus;
use rulehub_storage::{display_name, storage_key_from_reference, StorageError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MAX_MEDIA_REFERENCE_LEN: usize = 128;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateArticle {
    #[validate(length(min = 3, max = 128, message = "Title must be 3-128 characters"))]
    #[schema(example = "Test Article")]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    #[schema(example = "This is the content")]
    pub content: String,
    /// Storage keys (or paths/URLs ending in one) of uploaded media, in display order
    #[serde(default)]
    #[validate(custom(function = "media_references"))]
    #[schema(example = json!(["3f2a6c1e-8d4b-4a8e-9a57-0d9f3b1c2e4f"]))]
    pub media: Vec<String>,
}

/// Partial update. `media: None` leaves the media set untouched; `Some`, even
/// empty, replaces it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateArticle {
    #[validate(length(min = 3, max = 128, message = "Title must be 3-128 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: Option<String>,
    #[validate(custom(function = "media_references"))]
    pub media: Option<Vec<String>>,
}

fn media_references(media: &[String]) -> Result<(), ValidationError> {
    let len_ok = |m: &String| {
        let len = m.chars().count();
        (1..=MAX_MEDIA_REFERENCE_LEN).contains(&len)
    };
    if media.iter().all(len_ok) {
        Ok(())
    } else {
        Err(ValidationError::new("media_length")
            .with_message("Each media entry must be 1-128 characters".into()))
    }
}

/// Storage key and display name derived from one client media reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSpec {
    pub file_name: String,
    pub storage_key: String,
}

impl MediaSpec {
    pub fn from_reference(reference: &str) -> Result<Self, StorageError> {
        Ok(Self {
            storage_key: storage_key_from_reference(reference)?,
            file_name: display_name(reference),
        })
    }

    pub fn from_references(references: &[String]) -> Result<Vec<Self>, StorageError> {
        references.iter().map(|r| Self::from_reference(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaView {
    #[schema(example = "cat.png")]
    pub file_name: String,
    /// Download URL, resolved when the response is built
    pub url: String,
    pub status: MediaStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArticleView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Username of the owning user
    #[schema(example = "alice")]
    pub author: String,
    pub media: Vec<MediaView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a pending-media sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub promoted: usize,
    /// Rows whose object has still not been uploaded
    pub missing: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, content: &str) -> CreateArticle {
        CreateArticle {
            title: title.to_string(),
            content: content.to_string(),
            media: Vec::new(),
        }
    }

    #[test]
    fn test_title_bounds() {
        assert!(create("abc", "x").validate().is_ok());
        assert!(create(&"t".repeat(128), "x").validate().is_ok());
        assert!(create("ab", "x").validate().is_err());
        assert!(create(&"t".repeat(129), "x").validate().is_err());
    }

    #[test]
    fn test_content_bounds() {
        assert!(create("abc", &"c".repeat(10000)).validate().is_ok());
        assert!(create("abc", "").validate().is_err());
        assert!(create("abc", &"c".repeat(10001)).validate().is_err());
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        assert!(create(&"é".repeat(128), "x").validate().is_ok());
    }

    #[test]
    fn test_media_entry_bounds() {
        let mut article = create("abc", "x");
        article.media = vec!["m".repeat(128)];
        assert!(article.validate().is_ok());
        article.media = vec!["ok.png".to_string(), String::new()];
        assert!(article.validate().is_err());
        article.media = vec!["m".repeat(129)];
        assert!(article.validate().is_err());
    }

    #[test]
    fn test_update_fields_optional() {
        assert!(UpdateArticle::default().validate().is_ok());
        let update = UpdateArticle {
            title: Some("ab".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        let update = UpdateArticle {
            media: Some(vec![]),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_media_spec_derivations_are_independent() {
        let spec = MediaSpec::from_reference(
            "https://s3.example.com/media/3f2a6c1e-8d4b-4a8e-9a57-0d9f3b1c2e4f_cat.png?X-Amz-Expires=60",
        )
        .unwrap();
        assert_eq!(spec.storage_key, "3f2a6c1e-8d4b-4a8e-9a57-0d9f3b1c2e4f_cat.png");
        assert_eq!(spec.file_name, "cat.png");

        let spec = MediaSpec::from_reference("uploads/file1.jpg").unwrap();
        assert_eq!(spec.storage_key, "file1.jpg");
        assert_eq!(spec.file_name, "file1.jpg");
    }
}
