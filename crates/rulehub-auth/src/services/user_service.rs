use rulehub_entities::users;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use crate::error::AuthError;

pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a user. Usernames are unique among all users, deleted or not.
    pub async fn register(&self, username: &str, password: &str) -> Result<users::Model, AuthError> {
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let password_hash = hash_password(password)?;

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| match e.sql_err() {
            // Lost a race with a concurrent registration
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AuthError::UsernameTaken(username.to_string())
            }
            _ => AuthError::from(e),
        })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and return the matching live user
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<users::Model, AuthError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            debug!("Password mismatch for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn find_active(&self, user_id: Uuid) -> Result<Option<users::Model>, AuthError> {
        let user = users::Entity::find_by_id(user_id)
            .filter(users::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?;
        Ok(user)
    }
}
