//! Configuration objects handed to each component at construction
//!
//! Nothing below reads the process environment. The CLI assembles an
//! [`AppConfig`] from flags and environment variables and passes the
//! relevant section to every service it builds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

pub const DEFAULT_PRESIGNED_LIFETIME: Duration = Duration::from_secs(60 * 60);
/// SigV4 refuses to sign URLs valid for longer than a week
pub const MAX_PRESIGNED_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 1,
        }
    }
}

/// Object storage (S3 / MinIO) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Host and optional port of the S3 API, with or without scheme
    pub endpoint: String,
    /// Endpoint clients use to reach presigned URLs when it differs from `endpoint`
    pub public_endpoint: Option<String>,
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub use_ssl: bool,
    pub bucket: String,
    pub region: String,
    /// Stable public base URL. When set, download URLs are `{base}/{bucket}/{key}`
    pub base_url: Option<String>,
    pub presigned_lifetime: Duration,
}

impl StorageConfig {
    /// Endpoint URL for server-side S3 calls
    pub fn endpoint_url(&self) -> String {
        with_scheme(&self.endpoint, self.use_ssl)
    }

    /// Endpoint URL baked into presigned URLs
    pub fn presign_endpoint_url(&self) -> String {
        match &self.public_endpoint {
            Some(public) => with_scheme(public, self.use_ssl),
            None => self.endpoint_url(),
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(ServiceError::Configuration {
                message: "storage bucket must not be empty".to_string(),
            });
        }
        url::Url::parse(&self.endpoint_url()).map_err(|e| ServiceError::Configuration {
            message: format!("invalid storage endpoint '{}': {}", self.endpoint, e),
        })?;
        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url).map_err(|e| ServiceError::Configuration {
                message: format!("invalid storage base url '{}': {}", base_url, e),
            })?;
        }
        if self.presigned_lifetime.is_zero() {
            return Err(ServiceError::Configuration {
                message: "presigned url lifetime must be positive".to_string(),
            });
        }
        if self.presigned_lifetime > MAX_PRESIGNED_LIFETIME {
            return Err(ServiceError::Configuration {
                message: format!(
                    "presigned url lifetime {}s exceeds the {}s maximum",
                    self.presigned_lifetime.as_secs(),
                    MAX_PRESIGNED_LIFETIME.as_secs()
                ),
            });
        }
        Ok(())
    }
}

fn with_scheme(endpoint: &str, use_ssl: bool) -> String {
    if endpoint.contains("://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        let scheme = if use_ssl { "https" } else { "http" };
        format!("{}://{}", scheme, endpoint.trim_end_matches('/'))
    }
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub access_secret: String,
    #[serde(skip_serializing)]
    pub refresh_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Mark the refresh cookie `Secure`
    pub secure_cookies: bool,
}

impl AuthConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
            secure_cookies: false,
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(ServiceError::Configuration {
                message: "token secrets must not be empty".to_string(),
            });
        }
        if self.access_secret == self.refresh_secret {
            return Err(ServiceError::Configuration {
                message: "access and refresh token secrets must differ".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn validate(&self) -> ServiceResult<()> {
        self.storage.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> StorageConfig {
        StorageConfig {
            endpoint: "localhost:9000".to_string(),
            public_endpoint: None,
            access_key: "minio".to_string(),
            secret_key: "minio123".to_string(),
            use_ssl: false,
            bucket: "media".to_string(),
            region: "us-east-1".to_string(),
            base_url: None,
            presigned_lifetime: DEFAULT_PRESIGNED_LIFETIME,
        }
    }

    #[test]
    fn test_endpoint_scheme_follows_ssl_flag() {
        let mut config = storage();
        assert_eq!(config.endpoint_url(), "http://localhost:9000");
        config.use_ssl = true;
        assert_eq!(config.endpoint_url(), "https://localhost:9000");
        config.endpoint = "http://minio:9000/".to_string();
        assert_eq!(config.endpoint_url(), "http://minio:9000");
    }

    #[test]
    fn test_presign_endpoint_prefers_public() {
        let mut config = storage();
        assert_eq!(config.presign_endpoint_url(), "http://localhost:9000");
        config.public_endpoint = Some("cdn.example.com".to_string());
        assert_eq!(config.presign_endpoint_url(), "http://cdn.example.com");
    }

    #[test]
    fn test_storage_validation() {
        assert!(storage().validate().is_ok());

        let mut config = storage();
        config.bucket = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = storage();
        config.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presigned_lifetime_bounds() {
        let mut config = storage();
        config.presigned_lifetime = MAX_PRESIGNED_LIFETIME;
        assert!(config.validate().is_ok());

        config.presigned_lifetime = MAX_PRESIGNED_LIFETIME + Duration::from_secs(1);
        assert!(config.validate().is_err());

        config.presigned_lifetime = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_validation_requires_distinct_secrets() {
        assert!(AuthConfig::new("a", "b").validate().is_ok());
        assert!(AuthConfig::new("same", "same").validate().is_err());
        assert!(AuthConfig::new("", "b").validate().is_err());
    }
}
