//! Auth plugin: user/token services, bearer middleware and `/auth` routes

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use rulehub_core::plugin::{
    MiddlewareFuture, MiddlewarePriority, PluginContext, PluginError, PluginMiddleware, PluginRoutes,
    RulehubPlugin, ServiceRegistrationContext,
};
use rulehub_core::AuthConfig;
use sea_orm::DatabaseConnection;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{self, AuthApiDoc};
use crate::middleware::auth_middleware;
use crate::services::{TokenService, UserService};
use crate::AuthState;

#[derive(Default)]
pub struct AuthPlugin;

impl AuthPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl RulehubPlugin for AuthPlugin {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>()?;
            let config = context.require_service::<AuthConfig>()?;

            let user_service = Arc::new(UserService::new(db));
            let token_service = Arc::new(TokenService::new(&config));
            context.register_service(user_service.clone());
            context.register_service(token_service.clone());

            let auth_state = Arc::new(AuthState::new(
                user_service,
                token_service,
                config.secure_cookies,
            ));
            context.register_service(auth_state);

            tracing::debug!("Auth plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        let auth_state = context.require_service::<AuthState>()?;
        Ok(Some(PluginRoutes::new(
            handlers::configure_routes().with_state(auth_state),
        )))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(<AuthApiDoc as OpenApiTrait>::openapi())
    }

    fn configure_middleware(
        &self,
        context: &PluginContext,
    ) -> Result<Vec<PluginMiddleware>, PluginError> {
        let auth_state = context.require_service::<AuthState>()?;

        Ok(vec![PluginMiddleware {
            name: "auth_middleware".to_string(),
            plugin_name: self.name().to_string(),
            priority: MiddlewarePriority::Security,
            handler: Arc::new(move |req: Request, next: Next| -> MiddlewareFuture {
                let auth_state = auth_state.clone();
                Box::pin(auth_middleware(State(auth_state), req, next))
            }),
        }])
    }
}
