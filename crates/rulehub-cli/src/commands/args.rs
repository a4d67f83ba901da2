//! Argument groups shared by several commands

use clap::Args;
use rulehub_core::{DatabaseConfig, StorageConfig};
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://rulehub.db?mode=rwc")]
    pub database_url: String,
}

impl DatabaseArgs {
    pub fn to_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
    }
}

#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// MinIO / S3 endpoint as host:port
    #[arg(long, env = "MINIO_ENDPOINT")]
    pub minio_endpoint: String,

    #[arg(long, env = "MINIO_USERNAME")]
    pub minio_username: String,

    #[arg(long, env = "MINIO_PASSWORD", hide_env_values = true)]
    pub minio_password: String,

    #[arg(long, env = "MINIO_USE_SSL", default_value_t = false)]
    pub minio_use_ssl: bool,

    #[arg(long, env = "MINIO_BUCKET")]
    pub minio_bucket: String,

    #[arg(long, env = "MINIO_REGION", default_value = "us-east-1")]
    pub minio_region: String,

    /// Stable public base URL for downloads; presigned GET URLs when unset
    #[arg(long, env = "S3_BASE_URL")]
    pub s3_base_url: Option<String>,

    /// Endpoint browsers reach, used when signing URLs
    #[arg(long, env = "S3_PUBLIC_ENDPOINT")]
    pub s3_public_endpoint: Option<String>,

    /// Lifetime of presigned URLs in seconds
    #[arg(long, env = "S3_PRESIGNED_LIFETIME", default_value_t = 3600)]
    pub s3_presigned_lifetime: u64,
}

impl StorageArgs {
    pub fn to_config(&self) -> StorageConfig {
        StorageConfig {
            endpoint: self.minio_endpoint.clone(),
            public_endpoint: self.s3_public_endpoint.clone(),
            access_key: self.minio_username.clone(),
            secret_key: self.minio_password.clone(),
            use_ssl: self.minio_use_ssl,
            bucket: self.minio_bucket.clone(),
            region: self.minio_region.clone(),
            base_url: self.s3_base_url.clone().filter(|url| !url.is_empty()),
            presigned_lifetime: Duration::from_secs(self.s3_presigned_lifetime),
        }
    }
}
