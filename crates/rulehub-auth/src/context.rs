use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rulehub_core::error_builder;
use rulehub_core::problemdetails::Problem;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity established from a valid access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

/// Extractor for handlers that need an authenticated caller
///
/// Rejects with 401 when the auth middleware did not attach an
/// [`AuthContext`] to the request.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| error_builder::unauthorized().build())
    }
}
