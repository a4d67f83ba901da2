//! Common error types used across all Rulehub services

use thiserror::Error;

use crate::error_builder;
use crate::problemdetails::Problem;

/// Common service error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<ServiceError> for Problem {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound { resource } => error_builder::not_found()
                .detail(format!("{} not found", resource))
                .build(),
            ServiceError::Validation { message } => {
                error_builder::validation_error().detail(message).build()
            }
            ServiceError::Database(message) => {
                tracing::error!("Database error: {}", message);
                error_builder::internal_server_error().build()
            }
            ServiceError::Configuration { message } => {
                tracing::error!("Configuration error: {}", message);
                error_builder::internal_server_error().build()
            }
            ServiceError::Internal(error) => {
                tracing::error!("Internal error: {:#}", error);
                error_builder::internal_server_error().build()
            }
        }
    }
}
