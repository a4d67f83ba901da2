//! S3 / MinIO backed [`ObjectStore`]

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{Tag, Tagging};
use aws_sdk_s3::{Client, Config};
use chrono::Utc;
use rulehub_core::StorageConfig;
use std::time::Duration;
use tracing::{debug, info};

use super::object_store::{
    DownloadUrlMode, ObjectStatus, ObjectStore, UploadTarget, STATUS_PERMANENT, STATUS_TAG,
};
use crate::error::StorageError;
use crate::keys::{new_object_key, validate_key};

pub struct S3ObjectStore {
    /// Client for calls made by the server itself
    client: Client,
    /// Client whose endpoint is the one browsers reach, used only for signing
    presign_client: Client,
    bucket: String,
    upload_lifetime: Duration,
    download_mode: DownloadUrlMode,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        config
            .validate()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let client = build_client(config, config.endpoint_url());
        let presign_client = build_client(config, config.presign_endpoint_url());

        info!(
            "S3 object store configured for bucket '{}' at {}",
            config.bucket,
            config.endpoint_url()
        );

        Ok(Self {
            client,
            presign_client,
            bucket: config.bucket.clone(),
            upload_lifetime: config.presigned_lifetime,
            download_mode: DownloadUrlMode::from_config(config),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn presigning_config(&self, lifetime: Duration) -> Result<PresigningConfig, StorageError> {
        PresigningConfig::expires_in(lifetime)
            .map_err(|e| StorageError::Backend(format!("invalid presign lifetime: {}", e)))
    }

    async fn read_tags(&self, key: &str) -> Result<Vec<Tag>, StorageError> {
        let output = self
            .client
            .get_object_tagging()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(key, e))?;
        Ok(output.tag_set().to_vec())
    }
}

fn build_client(config: &StorageConfig, endpoint_url: String) -> Client {
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "rulehub-storage",
    );

    let s3_config = Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(endpoint_url)
        // MinIO serves buckets by path, not by virtual host
        .force_path_style(true)
        .build();

    Client::from_conf(s3_config)
}

/// Classify an SDK failure for `key`
fn map_sdk_error<E>(key: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StorageError::Unavailable(DisplayErrorContext(&err).to_string())
        }
        SdkError::ServiceError(service_err) => {
            let status = service_err.raw().status().as_u16();
            match service_err.err().code() {
                Some("NoSuchKey") | Some("NotFound") => {
                    StorageError::ObjectNotFound(key.to_string())
                }
                _ if status == 404 => StorageError::ObjectNotFound(key.to_string()),
                _ if status == 503 => {
                    StorageError::Unavailable(DisplayErrorContext(&err).to_string())
                }
                _ => StorageError::Backend(DisplayErrorContext(&err).to_string()),
            }
        }
        _ => StorageError::Backend(DisplayErrorContext(&err).to_string()),
    }
}

/// Only an unreachable backend is worth retrying; any other bucket failure
/// is a deployment fault, never a missing client object
fn bucket_probe_error(bucket: &str, err: StorageError) -> StorageError {
    match err {
        StorageError::Unavailable(_) => err,
        StorageError::ObjectNotFound(_) => {
            StorageError::Backend(format!("bucket '{}' does not exist", bucket))
        }
        other => StorageError::Backend(format!("bucket '{}' probe failed: {}", bucket, other)),
    }
}

fn tag(key: &str, value: &str) -> Result<Tag, StorageError> {
    Tag::builder()
        .key(key)
        .value(value)
        .build()
        .map_err(|e| StorageError::Backend(e.to_string()))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn issue_upload_target(&self) -> Result<UploadTarget, StorageError> {
        // Presigning is local; probe the bucket so an unreachable backend
        // is reported now rather than when the client uploads
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| bucket_probe_error(&self.bucket, map_sdk_error(&self.bucket, e)))?;

        let key = new_object_key();
        let presigned = self
            .presign_client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(self.presigning_config(self.upload_lifetime)?)
            .await
            .map_err(|e| map_sdk_error(&key, e))?;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.upload_lifetime)
                .unwrap_or_else(|_| chrono::Duration::hours(1));

        debug!("Issued upload target for key {}", key);

        Ok(UploadTarget {
            key,
            upload_url: presigned.uri().to_string(),
            expires_at,
        })
    }

    async fn promote_to_permanent(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let mut tags: Vec<Tag> = self
            .read_tags(key)
            .await?
            .into_iter()
            .filter(|t| t.key() != STATUS_TAG)
            .collect();
        tags.push(tag(STATUS_TAG, STATUS_PERMANENT)?);

        let tagging = Tagging::builder()
            .set_tag_set(Some(tags))
            .build()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        self.client
            .put_object_tagging()
            .bucket(&self.bucket)
            .key(key)
            .tagging(tagging)
            .send()
            .await
            .map_err(|e| map_sdk_error(key, e))?;

        debug!("Promoted object {} to permanent", key);
        Ok(())
    }

    async fn resolve_download_url(&self, key: &str) -> Result<String, StorageError> {
        validate_key(key)?;

        match &self.download_mode {
            DownloadUrlMode::Public { base_url } => {
                Ok(DownloadUrlMode::public_url(base_url, &self.bucket, key))
            }
            DownloadUrlMode::Presigned { lifetime } => {
                let presigned = self
                    .presign_client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .presigned(self.presigning_config(*lifetime)?)
                    .await
                    .map_err(|e| map_sdk_error(key, e))?;
                Ok(presigned.uri().to_string())
            }
        }
    }

    async fn object_status(&self, key: &str) -> Result<ObjectStatus, StorageError> {
        validate_key(key)?;

        match self.read_tags(key).await {
            Ok(tags) => {
                let status = tags
                    .iter()
                    .find(|t| t.key() == STATUS_TAG)
                    .map(|t| t.value());
                Ok(ObjectStatus::from_tag(status))
            }
            Err(StorageError::ObjectNotFound(_)) => Ok(ObjectStatus::Missing),
            Err(e) => Err(e),
        }
    }
}
