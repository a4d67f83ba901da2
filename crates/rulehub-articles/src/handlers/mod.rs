pub mod handler;
pub mod types;

pub use handler::{configure_routes, ArticleApiDoc};
pub use types::*;
