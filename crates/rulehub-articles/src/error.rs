use rulehub_core::error_builder;
use rulehub_core::problemdetails::Problem;
use rulehub_storage::StorageError;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Requesting user is unknown")]
    Unauthorized,

    #[error("Article {0} not found")]
    NotFound(Uuid),

    #[error("Object storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbErr> for ArticleError {
    fn from(err: DbErr) -> Self {
        ArticleError::Database(err.to_string())
    }
}

impl From<StorageError> for ArticleError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(reason) => ArticleError::Validation(reason),
            StorageError::Unavailable(msg) => ArticleError::StorageUnavailable(msg),
            StorageError::ObjectNotFound(key) => {
                ArticleError::Internal(format!("object '{}' missing from storage", key))
            }
            StorageError::Backend(msg) => ArticleError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for ArticleError {
    fn from(errors: ValidationErrors) -> Self {
        ArticleError::Validation(errors.to_string())
    }
}

impl From<ArticleError> for Problem {
    fn from(err: ArticleError) -> Self {
        match err {
            ArticleError::Validation(detail) => {
                error_builder::validation_error().detail(detail).build()
            }
            ArticleError::Unauthorized => error_builder::unauthorized()
                .detail("The requesting user does not exist")
                .build(),
            ArticleError::NotFound(id) => error_builder::not_found()
                .title("Article Not Found")
                .detail(format!("No article with id {}", id))
                .build(),
            ArticleError::StorageUnavailable(msg) => {
                error!("Object storage unavailable: {}", msg);
                error_builder::service_unavailable().build()
            }
            ArticleError::Database(msg) => {
                error!("Article database error: {}", msg);
                error_builder::internal_server_error().build()
            }
            ArticleError::Internal(msg) => {
                error!("Article internal error: {}", msg);
                error_builder::internal_server_error().build()
            }
        }
    }
}
