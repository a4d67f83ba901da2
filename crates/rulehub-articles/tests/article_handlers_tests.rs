use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rulehub_articles::ArticlesPlugin;
use rulehub_auth::AuthPlugin;
use rulehub_core::plugin::PluginManager;
use rulehub_core::AuthConfig;
use rulehub_database::test_utils::TestDatabase;
use rulehub_storage::test_utils::MemoryObjectStore;
use rulehub_storage::{ObjectStore, StoragePlugin};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    store: Arc<MemoryObjectStore>,
    _db: TestDatabase,
}

impl TestApp {
    async fn new() -> anyhow::Result<Self> {
        let db = TestDatabase::new().await?;
        let store = Arc::new(MemoryObjectStore::new());

        let mut manager = PluginManager::new();
        let services = manager.service_context();
        services.register_service::<DatabaseConnection>(db.connection_arc());
        services.register_service(Arc::new(AuthConfig::new("access-secret", "refresh-secret")));
        let object_store: Arc<dyn ObjectStore> = store.clone();
        services.register_service(object_store);

        manager.register_plugin(Box::new(AuthPlugin::new()));
        manager.register_plugin(Box::new(StoragePlugin::new()));
        manager.register_plugin(Box::new(ArticlesPlugin::new()));
        manager.initialize_plugins().await?;

        Ok(Self {
            router: manager.build_application()?,
            store,
            _db: db,
        })
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn login_as(&self, username: &str, password: &str) -> String {
        let credentials = json!({"username": username, "password": password});
        let (status, _) = self
            .send("POST", "/api/auth/register", None, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .send("POST", "/api/auth/login", None, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_alice_article_scenario() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let token = app.login_as("alice", "Passw0rd").await;

    let (status, created) = app
        .send(
            "POST",
            "/api/articles/",
            Some(&token),
            Some(json!({"title": "Test Article", "content": "This is the content"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, fetched) = app
        .send("GET", &format!("/api/articles/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Test Article");
    assert_eq!(fetched["content"], "This is the content");
    assert_eq!(fetched["author"], "alice");

    let (status, _) = app
        .send("GET", &format!("/api/articles/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, problem) = app
        .send(
            "PUT",
            &format!("/api/articles/{}", id),
            Some(&token),
            Some(json!({"title": "ab"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["title"], "Validation Error");

    let (_, refetched) = app
        .send("GET", &format!("/api/articles/{}", id), None, None)
        .await;
    assert_eq!(refetched["title"], "Test Article");
    Ok(())
}

#[tokio::test]
async fn test_media_replacement_scenario() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let token = app.login_as("bob", "Passw0rd").await;

    let (status, created) = app
        .send(
            "POST",
            "/api/articles",
            Some(&token),
            Some(json!({
                "title": "With media",
                "content": "body",
                "media": ["file1.jpg", "file2.png"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let media = created["media"].as_array().unwrap();
    assert_eq!(media.len(), 2);
    assert!(media.iter().all(|m| !m["url"].as_str().unwrap().is_empty()));

    let id = created["id"].as_str().unwrap();
    let (status, updated) = app
        .send(
            "PUT",
            &format!("/api/articles/{}", id),
            Some(&token),
            Some(json!({"media": ["file3.gif"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["media"].as_array().unwrap().len(), 1);

    let (_, fetched) = app
        .send("GET", &format!("/api/articles/{}", id), None, None)
        .await;
    let media = fetched["media"].as_array().unwrap();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0]["file_name"], "file3.gif");
    Ok(())
}

#[tokio::test]
async fn test_presigned_upload_flow() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let token = app.login_as("carol", "Passw0rd").await;

    let (status, upload) = app
        .send("POST", "/api/media/upload-temp", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let file_id = upload["file_id"].as_str().unwrap().to_string();
    assert!(!upload["temp_url"].as_str().unwrap().is_empty());

    // Client PUTs the bytes to temp_url
    app.store.upload(&file_id);

    let (status, created) = app
        .send(
            "POST",
            "/api/articles",
            Some(&token),
            Some(json!({"title": "Uploaded", "content": "body", "media": [file_id]})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["media"][0]["status"], "permanent");
    assert!(created["media"][0]["url"]
        .as_str()
        .unwrap()
        .ends_with(&file_id));

    let (status, resolved) = app
        .send(
            "GET",
            &format!("/api/media/get-url/{}", file_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "permanent");
    Ok(())
}

#[tokio::test]
async fn test_writes_require_authentication() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let body = json!({"title": "Title", "content": "body"});

    let (status, _) = app
        .send("POST", "/api/articles", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("POST", "/api/articles", Some("not.a.token"), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/articles/{}", Uuid::new_v4()),
            None,
            Some(body),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_malformed_article_id_is_bad_request() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, problem) = app
        .send("GET", "/api/articles/not-a-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["status"], 400);
    Ok(())
}

#[tokio::test]
async fn test_missing_required_field_is_bad_request() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let token = app.login_as("dave", "Passw0rd").await;
    let (status, _) = app
        .send(
            "POST",
            "/api/articles",
            Some(&token),
            Some(json!({"content": "no title"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_openapi_covers_all_plugins() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, doc) = app.send("GET", "/api/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let paths = doc["paths"].as_object().unwrap();
    for path in [
        "/articles",
        "/articles/{id}",
        "/media/upload-temp",
        "/media/get-url/{key}",
        "/auth/login",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    Ok(())
}
