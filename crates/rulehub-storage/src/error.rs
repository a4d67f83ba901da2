//! Error types for object storage

use rulehub_core::error_builder;
use rulehub_core::problemdetails::Problem;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The key was issued but nothing was ever uploaded under it
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound(_))
    }
}

impl From<StorageError> for Problem {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(reason) => error_builder::validation_error()
                .detail(reason)
                .build(),
            StorageError::ObjectNotFound(key) => error_builder::not_found()
                .title("Object Not Found")
                .detail(format!("No object has been uploaded under key '{}'", key))
                .build(),
            StorageError::Unavailable(msg) => {
                error!("Object storage unreachable: {}", msg);
                error_builder::service_unavailable().build()
            }
            StorageError::Backend(msg) => {
                error!("Object storage error: {}", msg);
                error_builder::internal_server_error().build()
            }
        }
    }
}
