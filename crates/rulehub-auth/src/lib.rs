//! Authentication for the Rulehub API
//!
//! - argon2 password hashing and user registration
//! - HS256 access and refresh tokens
//! - bearer middleware that places an [`AuthContext`] in request extensions
//! - the [`RequireAuth`] extractor used by protected handlers
//! - `/auth/register`, `/auth/login` and `/auth/refresh`

pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod plugin;
pub mod services;
pub mod state;

pub use context::{AuthContext, RequireAuth};
pub use error::AuthError;
pub use middleware::auth_middleware;
pub use plugin::AuthPlugin;
pub use services::{hash_password, verify_password, TokenPair, TokenService, UserService};
pub use state::AuthState;
