use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use rulehub_articles::ArticlesPlugin;
use rulehub_auth::AuthPlugin;
use rulehub_core::plugin::PluginManager;
use rulehub_core::AppConfig;
use rulehub_database::DbConnection;
use rulehub_storage::StoragePlugin;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Register core services and plugins, then assemble the HTTP router
pub async fn build_application(db: Arc<DbConnection>, config: &AppConfig) -> anyhow::Result<Router> {
    let mut plugin_manager = PluginManager::new();

    let service_context = plugin_manager.service_context();
    service_context.register_service::<DatabaseConnection>(db);
    service_context.register_service(Arc::new(config.auth.clone()));
    service_context.register_service(Arc::new(config.storage.clone()));

    // Storage must precede articles, which consumes the object store
    plugin_manager.register_plugin(Box::new(AuthPlugin::new()));
    plugin_manager.register_plugin(Box::new(StoragePlugin::new()));
    plugin_manager.register_plugin(Box::new(ArticlesPlugin::new()));

    debug!("Initializing plugins");
    plugin_manager.initialize_plugins().await?;

    let app = plugin_manager
        .build_application()?
        .route("/ping", get(ping))
        .layer(cors_layer(&config.http.allowed_origins)?)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http());

    info!("Plugin system initialized successfully");
    Ok(app)
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "RuleHUB backend is ok" }))
}

fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins = allowed_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true))
}
