use rulehub_core::error_builder;
use rulehub_core::problemdetails::Problem;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User no longer exists")]
    UserNotFound,

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    TokenSigning(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(error: sea_orm::DbErr) -> Self {
        AuthError::Database(error.to_string())
    }
}

impl From<AuthError> for Problem {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => error_builder::unauthorized()
                .title("Invalid Credentials")
                .detail("Invalid username or password")
                .build(),
            AuthError::UsernameTaken(username) => error_builder::conflict()
                .title("Username Taken")
                .detail(format!("Username '{}' is already taken", username))
                .build(),
            AuthError::InvalidToken | AuthError::UserNotFound => error_builder::unauthorized()
                .title("Invalid Token")
                .detail("The token is invalid or has expired")
                .build(),
            AuthError::PasswordHash(msg)
            | AuthError::TokenSigning(msg)
            | AuthError::Database(msg) => {
                error!("Authentication failure: {}", msg);
                error_builder::internal_server_error().build()
            }
        }
    }
}
