mod handler;
mod types;

pub use handler::{configure_routes, AuthApiDoc, REFRESH_COOKIE_NAME};
pub use types::*;
