use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rulehub_auth::AuthPlugin;
use rulehub_core::plugin::PluginManager;
use rulehub_core::AuthConfig;
use rulehub_database::test_utils::TestDatabase;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app(db: &TestDatabase) -> Router {
    let mut manager = PluginManager::new();
    manager
        .service_context()
        .register_service::<DatabaseConnection>(db.connection_arc());
    manager
        .service_context()
        .register_service(Arc::new(AuthConfig::new("access-secret", "refresh-secret")));
    manager.register_plugin(Box::new(AuthPlugin::new()));
    manager.initialize_plugins().await.unwrap();
    manager.build_application().unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Option<String>, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Option<String>, Value) {
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cookie, body)
}

#[tokio::test]
async fn test_register_login_refresh_flow() -> anyhow::Result<()> {
    let db = TestDatabase::new().await?;
    let app = app(&db).await;

    let (status, _, body) = post_json(
        &app,
        "/api/auth/register",
        json!({"username": "alice", "password": "Passw0rd"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body["id"].as_str().is_some());

    let (status, cookie, body) = post_json(
        &app,
        "/api/auth/login",
        json!({"username": "alice", "password": "Passw0rd"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);

    let cookie = cookie.expect("refresh cookie");
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));

    let refresh_pair = cookie.split(';').next().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .header(header::COOKIE, refresh_pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    let (status, cookie, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some());
    assert!(cookie.is_some());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() -> anyhow::Result<()> {
    let db = TestDatabase::new().await?;
    let app = app(&db).await;
    let payload = json!({"username": "bob", "password": "Passw0rd"});

    let (status, _, _) = post_json(&app, "/api/auth/register", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _, body) = post_json(&app, "/api/auth/register", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["title"], "Username Taken");
    Ok(())
}

#[tokio::test]
async fn test_weak_password_is_validation_error() -> anyhow::Result<()> {
    let db = TestDatabase::new().await?;
    let app = app(&db).await;

    let (status, _, body) = post_json(
        &app,
        "/api/auth/register",
        json!({"username": "carol", "password": "NODIGITS"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation Error");
    assert!(body["errors"]["password"].is_array());
    Ok(())
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let db = TestDatabase::new().await?;
    let app = app(&db).await;

    post_json(
        &app,
        "/api/auth/register",
        json!({"username": "dave", "password": "Passw0rd"}),
    )
    .await;
    let (status, cookie, body) = post_json(
        &app,
        "/api/auth/login",
        json!({"username": "dave", "password": "Wrong0ne"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());
    assert_eq!(body["title"], "Invalid Credentials");
    Ok(())
}

#[tokio::test]
async fn test_refresh_without_cookie_is_unauthorized() -> anyhow::Result<()> {
    let db = TestDatabase::new().await?;
    let app = app(&db).await;

    let (status, _, _) = post_json(&app, "/api/auth/refresh", json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .header(header::COOKIE, "refresh_token=not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
