use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rulehub_core::StorageConfig;
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

use crate::error::StorageError;

/// Object tag carrying the lifecycle state. Absent means temporary.
pub const STATUS_TAG: &str = "status";
pub const STATUS_TEMPORARY: &str = "temporary";
pub const STATUS_PERMANENT: &str = "permanent";

/// Where a client uploads the bytes for a freshly issued key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub key: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStatus {
    /// Nothing has been uploaded under the key
    Missing,
    Temporary,
    Permanent,
}

impl ObjectStatus {
    pub fn from_tag(value: Option<&str>) -> Self {
        match value {
            Some(STATUS_PERMANENT) => ObjectStatus::Permanent,
            _ => ObjectStatus::Temporary,
        }
    }
}

/// How download URLs are produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadUrlMode {
    /// Time-bounded signed GET
    Presigned { lifetime: Duration },
    /// Stable `{base_url}/{bucket}/{key}`
    Public { base_url: String },
}

impl DownloadUrlMode {
    pub fn from_config(config: &StorageConfig) -> Self {
        match &config.base_url {
            Some(base_url) => DownloadUrlMode::Public {
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            None => DownloadUrlMode::Presigned {
                lifetime: config.presigned_lifetime,
            },
        }
    }

    pub fn public_url(base_url: &str, bucket: &str, key: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            bucket,
            urlencoding::encode(key)
        )
    }
}

/// Blob store operations the article flow depends on.
///
/// Issuing a key and promoting it are separate from the object actually
/// existing: a client may reference a key it never uploaded to, which
/// surfaces as [`StorageError::ObjectNotFound`] on promotion.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Allocate a fresh temporary key and a URL the client can PUT bytes to
    async fn issue_upload_target(&self) -> Result<UploadTarget, StorageError>;

    /// Mark an uploaded object as retained
    async fn promote_to_permanent(&self, key: &str) -> Result<(), StorageError>;

    /// URL to fetch the object; does not check that it exists
    async fn resolve_download_url(&self, key: &str) -> Result<String, StorageError>;

    async fn object_status(&self, key: &str) -> Result<ObjectStatus, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulehub_core::DEFAULT_PRESIGNED_LIFETIME;

    fn config(base_url: Option<&str>) -> StorageConfig {
        StorageConfig {
            endpoint: "localhost:9000".to_string(),
            public_endpoint: None,
            access_key: "minio".to_string(),
            secret_key: "minio123".to_string(),
            use_ssl: false,
            bucket: "media".to_string(),
            region: "us-east-1".to_string(),
            base_url: base_url.map(str::to_string),
            presigned_lifetime: DEFAULT_PRESIGNED_LIFETIME,
        }
    }

    #[test]
    fn test_mode_follows_base_url() {
        assert_eq!(
            DownloadUrlMode::from_config(&config(None)),
            DownloadUrlMode::Presigned {
                lifetime: DEFAULT_PRESIGNED_LIFETIME
            }
        );
        assert_eq!(
            DownloadUrlMode::from_config(&config(Some("https://files.example.com/"))),
            DownloadUrlMode::Public {
                base_url: "https://files.example.com".to_string()
            }
        );
    }

    #[test]
    fn test_public_url_layout() {
        assert_eq!(
            DownloadUrlMode::public_url("https://files.example.com/", "media", "abc.png"),
            "https://files.example.com/media/abc.png"
        );
    }

    #[test]
    fn test_untagged_object_counts_as_temporary() {
        assert_eq!(ObjectStatus::from_tag(None), ObjectStatus::Temporary);
        assert_eq!(
            ObjectStatus::from_tag(Some(STATUS_TEMPORARY)),
            ObjectStatus::Temporary
        );
        assert_eq!(
            ObjectStatus::from_tag(Some(STATUS_PERMANENT)),
            ObjectStatus::Permanent
        );
    }
}
