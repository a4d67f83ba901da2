use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rulehub_auth::AuthContext;
use rulehub_storage::handlers::{configure_routes, MediaAppState};
use rulehub_storage::test_utils::{MemoryObjectStore, StoreOp, MEMORY_BASE_URL};
use rulehub_storage::StorageError;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

fn app(store: Arc<MemoryObjectStore>) -> Router {
    configure_routes().with_state(Arc::new(MediaAppState::new(store)))
}

fn request(method: &str, uri: &str, authenticated: bool) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if authenticated {
        builder = builder.extension(AuthContext {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
        });
    }
    builder.body(Body::empty()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_temp_issues_key() {
    let store = Arc::new(MemoryObjectStore::new());
    let response = app(store.clone())
        .oneshot(request("POST", "/media/upload-temp", true))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json(response).await;
    let file_id = body["file_id"].as_str().unwrap();
    assert!(store.was_issued(file_id));
    assert!(body["temp_url"].as_str().unwrap().contains(file_id));
}

#[tokio::test]
async fn test_upload_temp_requires_auth() {
    let response = app(Arc::new(MemoryObjectStore::new()))
        .oneshot(request("POST", "/media/upload-temp", false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_temp_storage_down() {
    let store = Arc::new(MemoryObjectStore::new());
    store.fail(
        StoreOp::IssueUploadTarget,
        StorageError::Unavailable("connection refused".to_string()),
    );

    let response = app(store)
        .oneshot(request("POST", "/media/upload-temp", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json(response).await;
    assert_eq!(body["title"], "Storage Unavailable");
}

#[tokio::test]
async fn test_get_url_for_uploaded_object() {
    let store = Arc::new(MemoryObjectStore::new());
    store.upload("photo-key");

    let response = app(store)
        .oneshot(request("GET", "/media/get-url/photo-key", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(
        body["url"],
        format!("{}/media/photo-key", MEMORY_BASE_URL)
    );
    assert_eq!(body["status"], "temporary");
}

#[tokio::test]
async fn test_get_url_missing_object() {
    let response = app(Arc::new(MemoryObjectStore::new()))
        .oneshot(request("GET", "/media/get-url/never-uploaded", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_url_rejects_malformed_key() {
    let response = app(Arc::new(MemoryObjectStore::new()))
        .oneshot(request("GET", "/media/get-url/a%20b", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
