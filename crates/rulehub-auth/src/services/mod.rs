mod password;
mod token_service;
mod user_service;

pub use password::{hash_password, verify_password};
pub use token_service::{AccessClaims, RefreshClaims, TokenPair, TokenService};
pub use user_service::UserService;
