//! Request and response types for media handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::{ObjectStatus, ObjectStore, UploadTarget};

/// Application state for media handlers
pub struct MediaAppState {
    pub object_store: Arc<dyn ObjectStore>,
}

impl MediaAppState {
    pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
        Self { object_store }
    }
}

/// Presigned upload target for a new media object
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MediaUploadResponse {
    /// URL the client must PUT the file bytes to
    #[schema(example = "https://s3.example.com/media/3f2a6c1e-8d4b-4a8e-9a57-0d9f3b1c2e4f?X-Amz-Signature=...")]
    pub temp_url: String,
    /// Storage key to reference from an article's media list
    #[schema(example = "3f2a6c1e-8d4b-4a8e-9a57-0d9f3b1c2e4f")]
    pub file_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<UploadTarget> for MediaUploadResponse {
    fn from(target: UploadTarget) -> Self {
        Self {
            temp_url: target.upload_url,
            file_id: target.key,
            expires_at: target.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MediaUrlResponse {
    #[schema(example = "https://files.example.com/media/3f2a6c1e-8d4b-4a8e-9a57-0d9f3b1c2e4f")]
    pub url: String,
    pub status: ObjectStatus,
}
