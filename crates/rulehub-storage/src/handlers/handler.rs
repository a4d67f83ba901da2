//! HTTP handlers for media

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rulehub_auth::RequireAuth;
use rulehub_core::problemdetails::{Problem, ProblemDetails};
use tracing::info;
use utoipa::OpenApi;

use super::types::*;
use crate::error::StorageError;
use crate::keys::validate_key;
use crate::services::ObjectStatus;

#[derive(OpenApi)]
#[openapi(
    paths(upload_temp, get_url),
    components(schemas(MediaUploadResponse, MediaUrlResponse, ObjectStatus)),
    tags((name = "Media", description = "Media upload targets and download URLs"))
)]
pub struct StorageApiDoc;

pub fn configure_routes() -> Router<Arc<MediaAppState>> {
    Router::new()
        .route("/media/upload-temp", post(upload_temp))
        .route("/media/get-url/{key}", get(get_url))
}

/// Issue a presigned upload URL under a fresh temporary key
#[utoipa::path(
    tag = "Media",
    post,
    path = "/media/upload-temp",
    responses(
        (status = 201, description = "Upload target issued", body = MediaUploadResponse),
        (status = 401, description = "Unauthorized", body = ProblemDetails),
        (status = 503, description = "Object storage unreachable", body = ProblemDetails)
    ),
    security(("bearer_auth" = []))
)]
async fn upload_temp(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<MediaAppState>>,
) -> Result<impl IntoResponse, Problem> {
    let target = state.object_store.issue_upload_target().await?;
    info!("User {} obtained upload target {}", auth.user_id, target.key);

    Ok((StatusCode::CREATED, Json(MediaUploadResponse::from(target))))
}

/// Resolve a download URL for an uploaded object
#[utoipa::path(
    tag = "Media",
    get,
    path = "/media/get-url/{key}",
    params(("key" = String, Path, description = "Storage key")),
    responses(
        (status = 200, description = "Download URL", body = MediaUrlResponse),
        (status = 400, description = "Malformed key", body = ProblemDetails),
        (status = 401, description = "Unauthorized", body = ProblemDetails),
        (status = 404, description = "Nothing uploaded under the key", body = ProblemDetails),
        (status = 503, description = "Object storage unreachable", body = ProblemDetails)
    ),
    security(("bearer_auth" = []))
)]
async fn get_url(
    RequireAuth(_auth): RequireAuth,
    State(state): State<Arc<MediaAppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    validate_key(&key)?;

    let status = state.object_store.object_status(&key).await?;
    if status == ObjectStatus::Missing {
        return Err(StorageError::ObjectNotFound(key).into());
    }

    let url = state.object_store.resolve_download_url(&key).await?;
    Ok(Json(MediaUrlResponse { url, status }))
}
