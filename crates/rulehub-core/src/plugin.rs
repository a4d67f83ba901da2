//! Plugin system for modular service registration and route configuration
//!
//! Each feature crate exposes one [`RulehubPlugin`]. Plugins register the
//! services they provide into a shared [`ServiceRegistry`], pull the ones
//! they depend on, and contribute routes, middleware and OpenAPI paths to
//! the application assembled by [`PluginManager`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use axum::extract::Request;
use axum::response::Response;
use axum::routing::get;
use axum::{middleware::Next, Json, Router};
use thiserror::Error;
use tracing::debug;
use utoipa::openapi::security::SecurityScheme;
use utoipa::openapi::{ComponentsBuilder, OpenApi};

// Re-export for plugin implementations
pub use axum;
pub use utoipa;

/// Middleware execution priority. Lower values run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MiddlewarePriority {
    /// Authentication
    Security,
    /// Logging and metrics
    Observability,
    Business,
}

pub type MiddlewareFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

pub type MiddlewareHandler = Arc<dyn Fn(Request, Next) -> MiddlewareFuture + Send + Sync>;

/// Middleware contributed by a plugin and applied to every API route
pub struct PluginMiddleware {
    pub name: String,
    pub plugin_name: String,
    pub priority: MiddlewarePriority,
    pub handler: MiddlewareHandler,
}

impl std::fmt::Debug for PluginMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginMiddleware")
            .field("name", &self.name)
            .field("plugin_name", &self.plugin_name)
            .field("priority", &self.priority)
            .field("handler", &"<function>")
            .finish()
    }
}

/// Errors that can occur during plugin operations
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin registration failed for '{plugin_name}': {error}")]
    PluginRegistrationFailed { plugin_name: String, error: String },

    #[error("Service '{service_type}' is required but not registered")]
    ServiceNotFound { service_type: String },

    #[error("Failed to initialize plugin system: {0}")]
    InitializationFailed(String),
}

/// Core plugin trait that defines the plugin interface
pub trait RulehubPlugin: Send + Sync {
    /// Unique identifier for this plugin
    fn name(&self) -> &'static str;

    /// Register services that this plugin provides
    ///
    /// Use `context.require_service::<T>()` to get dependencies.
    /// Use `context.register_service(service)` to provide services for other plugins.
    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>>;

    /// Configure HTTP routes for this plugin
    fn configure_routes(&self, _context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        Ok(None)
    }

    /// Provide OpenAPI schema for this plugin's endpoints
    fn openapi_schema(&self) -> Option<OpenApi> {
        None
    }

    /// Configure middleware applied to all API routes
    fn configure_middleware(
        &self,
        _context: &PluginContext,
    ) -> Result<Vec<PluginMiddleware>, PluginError> {
        Ok(Vec::new())
    }
}

/// Route configuration returned by plugins
pub struct PluginRoutes {
    pub router: Router,
}

impl PluginRoutes {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

/// Type-safe service registry for dependency injection
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service for other plugins to use
    pub fn register<T: Send + Sync + 'static + ?Sized>(&self, service: Arc<T>) {
        debug!("Registering service: {}", std::any::type_name::<T>());
        self.services
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(TypeId::of::<T>(), Box::new(service));
    }

    /// Get a service if it's registered
    pub fn get<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.services
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&TypeId::of::<T>())
            .and_then(|any| any.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Require a service, failing with the missing type name
    pub fn require<T: Send + Sync + 'static + ?Sized>(&self) -> Result<Arc<T>, PluginError> {
        self.get::<T>().ok_or_else(|| PluginError::ServiceNotFound {
            service_type: std::any::type_name::<T>().to_string(),
        })
    }
}

/// Read-only context handed to plugins once services are registered
pub struct PluginContext {
    service_registry: Arc<ServiceRegistry>,
}

impl PluginContext {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            service_registry: registry,
        }
    }

    pub fn get_service<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.service_registry.get::<T>()
    }

    pub fn require_service<T: Send + Sync + 'static + ?Sized>(&self) -> Result<Arc<T>, PluginError> {
        self.service_registry.require::<T>()
    }
}

/// Context used during service registration
#[derive(Default)]
pub struct ServiceRegistrationContext {
    service_registry: Arc<ServiceRegistry>,
}

impl ServiceRegistrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_service<T: Send + Sync + 'static + ?Sized>(&self, service: Arc<T>) {
        self.service_registry.register(service);
    }

    pub fn get_service<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.service_registry.get::<T>()
    }

    pub fn require_service<T: Send + Sync + 'static + ?Sized>(&self) -> Result<Arc<T>, PluginError> {
        self.service_registry.require::<T>()
    }

    pub fn create_plugin_context(&self) -> PluginContext {
        PluginContext::new(self.service_registry.clone())
    }
}

/// Handles plugin registration, initialization, and application building
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn RulehubPlugin>>,
    context: ServiceRegistrationContext,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin (order matters for dependencies)
    pub fn register_plugin(&mut self, plugin: Box<dyn RulehubPlugin>) {
        debug!("Registering plugin: {}", plugin.name());
        self.plugins.push(plugin);
    }

    /// Initialize all plugins in registration order
    pub async fn initialize_plugins(&mut self) -> Result<(), PluginError> {
        debug!("Initializing {} plugins", self.plugins.len());

        for plugin in &self.plugins {
            plugin.register_services(&self.context).await.map_err(|e| {
                PluginError::PluginRegistrationFailed {
                    plugin_name: plugin.name().to_string(),
                    error: e.to_string(),
                }
            })?;

            debug!("Successfully initialized plugin: {}", plugin.name());
        }

        Ok(())
    }

    /// Build the application: plugin routes and `/openapi.json` nested under `/api`
    pub fn build_application(&self) -> Result<Router, PluginError> {
        let plugin_context = self.context.create_plugin_context();
        let mut api_router = Router::new();

        for plugin in &self.plugins {
            if let Some(plugin_routes) = plugin.configure_routes(&plugin_context)? {
                debug!("Adding routes for plugin: {}", plugin.name());
                api_router = api_router.merge(plugin_routes.router);
            }
        }

        let openapi = self.build_unified_openapi();
        api_router = api_router.route(
            "/openapi.json",
            get(move || {
                let openapi = openapi.clone();
                async move { Json(openapi) }
            }),
        );

        let mut middleware = Vec::new();
        for plugin in &self.plugins {
            middleware.extend(plugin.configure_middleware(&plugin_context)?);
        }
        api_router = apply_middleware(api_router, middleware);

        Ok(Router::new().nest("/api", api_router))
    }

    /// Get the unified OpenAPI schema from all plugins
    pub fn get_unified_openapi(&self) -> OpenApi {
        self.build_unified_openapi()
    }

    pub fn service_context(&self) -> &ServiceRegistrationContext {
        &self.context
    }

    fn build_unified_openapi(&self) -> OpenApi {
        use utoipa::openapi::*;

        let mut combined = OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title("Rulehub")
                    .description(Some("Articles with media attachments stored in S3-compatible storage"))
                    .version(env!("CARGO_PKG_VERSION"))
                    .build(),
            )
            .servers(Some(vec![ServerBuilder::new()
                .url("/api")
                .description(Some("Base path for all API endpoints"))
                .build()]))
            .components(Some(
                ComponentsBuilder::new()
                    .security_scheme("bearer_auth", bearer_auth_scheme())
                    .build(),
            ))
            .build();

        for plugin in &self.plugins {
            if let Some(plugin_openapi) = plugin.openapi_schema() {
                debug!("Merging OpenAPI schema for plugin: {}", plugin.name());
                combined = merge_openapi_schemas(combined, plugin_openapi);
            }
        }

        combined
    }
}

fn merge_openapi_schemas(mut base: OpenApi, plugin_schema: OpenApi) -> OpenApi {
    for (path, path_item) in plugin_schema.paths.paths {
        base.paths.paths.insert(path, path_item);
    }

    if let Some(plugin_components) = plugin_schema.components {
        let base_components = base
            .components
            .get_or_insert_with(|| ComponentsBuilder::new().build());
        for (name, schema) in plugin_components.schemas {
            base_components.schemas.insert(name, schema);
        }
        for (name, response) in plugin_components.responses {
            base_components.responses.insert(name, response);
        }
    }

    if let Some(plugin_tags) = plugin_schema.tags {
        base.tags.get_or_insert_with(Vec::new).extend(plugin_tags);
    }

    base
}

fn bearer_auth_scheme() -> SecurityScheme {
    use utoipa::openapi::security::*;

    let mut http_scheme = Http::new(HttpAuthScheme::Bearer);
    http_scheme.bearer_format = Some("JWT".to_string());
    http_scheme.description =
        Some("Access token returned by `/auth/login`. Use format: `Bearer <token>`.".to_string());

    SecurityScheme::Http(http_scheme)
}

/// Layers are wrapped outermost-last, so apply in reverse priority order
fn apply_middleware(mut router: Router, mut middleware: Vec<PluginMiddleware>) -> Router {
    middleware.sort_by_key(|mw| mw.priority);

    for mw in middleware.into_iter().rev() {
        debug!(
            "Applying middleware: {} from plugin: {}",
            mw.name, mw.plugin_name
        );
        let handler = mw.handler;
        router = router.layer(axum::middleware::from_fn(move |req: Request, next: Next| {
            let handler = handler.clone();
            async move { handler(req, next).await }
        }));
    }

    router
}
