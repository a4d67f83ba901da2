//! Core utilities and types shared across all Rulehub crates

pub mod config;
pub mod error;
pub mod error_builder;
pub mod plugin;
pub mod problemdetails;
pub use problemdetails::ProblemDetails;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::*;
pub use error::*;
pub use error_builder::*;
pub use types::*;
pub use validation::ValidatedJson;

// Re-export external dependencies
pub use anyhow;
pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tokio;
pub use tracing;
pub use uuid;
pub use validator;
