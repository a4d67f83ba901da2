//! Storage plugin: object store service and `/media` routes

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rulehub_core::plugin::{
    PluginContext, PluginError, PluginRoutes, RulehubPlugin, ServiceRegistrationContext,
};
use rulehub_core::StorageConfig;
use tracing::debug;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{configure_routes, MediaAppState, StorageApiDoc};
use crate::services::{ObjectStore, S3ObjectStore};

/// Registers an `Arc<dyn ObjectStore>` for other plugins.
///
/// When a store is already present in the registry it is reused; otherwise
/// an [`S3ObjectStore`] is built from the registered [`StorageConfig`].
#[derive(Default)]
pub struct StoragePlugin;

impl StoragePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl RulehubPlugin for StoragePlugin {
    fn name(&self) -> &'static str {
        "storage"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let object_store = match context.get_service::<dyn ObjectStore>() {
                Some(store) => store,
                None => {
                    let config = context.require_service::<StorageConfig>()?;
                    let store = S3ObjectStore::new(&config).map_err(|e| {
                        PluginError::PluginRegistrationFailed {
                            plugin_name: self.name().to_string(),
                            error: e.to_string(),
                        }
                    })?;
                    let store: Arc<dyn ObjectStore> = Arc::new(store);
                    context.register_service(store.clone());
                    store
                }
            };

            context.register_service(Arc::new(MediaAppState::new(object_store)));

            debug!("Storage plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        let state = context.require_service::<MediaAppState>()?;
        Ok(Some(PluginRoutes::new(configure_routes().with_state(state))))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(<StorageApiDoc as OpenApiTrait>::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemoryObjectStore;

    #[tokio::test]
    async fn test_reuses_registered_store() {
        let context = ServiceRegistrationContext::new();
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
        context.register_service(store);

        StoragePlugin::new()
            .register_services(&context)
            .await
            .unwrap();
        assert!(context.get_service::<MediaAppState>().is_some());
    }

    #[tokio::test]
    async fn test_missing_config_fails_registration() {
        let context = ServiceRegistrationContext::new();
        let result = StoragePlugin::new().register_services(&context).await;
        assert!(matches!(result, Err(PluginError::ServiceNotFound { .. })));
    }
}
