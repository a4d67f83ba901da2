//! Articles plugin: coordinator service and `/articles` routes

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rulehub_core::plugin::{
    PluginContext, PluginError, PluginRoutes, RulehubPlugin, ServiceRegistrationContext,
};
use rulehub_storage::ObjectStore;
use sea_orm::DatabaseConnection;
use tracing::debug;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{configure_routes, ArticleApiDoc, ArticlesAppState};
use crate::services::ArticleService;

/// Must be registered after the storage plugin, which provides the object store
#[derive(Default)]
pub struct ArticlesPlugin;

impl ArticlesPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl RulehubPlugin for ArticlesPlugin {
    fn name(&self) -> &'static str {
        "articles"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>()?;
            let object_store = context.require_service::<dyn ObjectStore>()?;

            let article_service = Arc::new(ArticleService::new(db, object_store));
            context.register_service(article_service.clone());
            context.register_service(Arc::new(ArticlesAppState::new(article_service)));

            debug!("Articles plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        let state = context.require_service::<ArticlesAppState>()?;
        Ok(Some(PluginRoutes::new(configure_routes().with_state(state))))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(<ArticleApiDoc as OpenApiTrait>::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_article_paths() {
        let schema = ArticlesPlugin::new().openapi_schema().unwrap();
        assert!(schema.paths.paths.contains_key("/articles"));
        assert!(schema.paths.paths.contains_key("/articles/{id}"));
    }

    #[tokio::test]
    async fn test_requires_object_store() {
        let context = ServiceRegistrationContext::new();
        let result = ArticlesPlugin::new().register_services(&context).await;
        assert!(matches!(result, Err(PluginError::ServiceNotFound { .. })));
    }
}
