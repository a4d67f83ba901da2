//! HTTP handlers for media uploads and download URLs

pub mod handler;
pub mod types;

pub use handler::{configure_routes, StorageApiDoc};
pub use types::*;
