use std::sync::Arc;

use crate::services::{TokenService, UserService};

/// Shared state for the auth handlers and middleware
#[derive(Clone)]
pub struct AuthState {
    pub user_service: Arc<UserService>,
    pub token_service: Arc<TokenService>,
    /// Mark the refresh cookie `Secure`
    pub secure_cookies: bool,
}

impl AuthState {
    pub fn new(
        user_service: Arc<UserService>,
        token_service: Arc<TokenService>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            user_service,
            token_service,
            secure_cookies,
        }
    }
}
