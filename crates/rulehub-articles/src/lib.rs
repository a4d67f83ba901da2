//! Articles and their media sets
//!
//! [`ArticleService`] coordinates every write that touches both the database
//! and object storage. Article and media rows are committed together in one
//! transaction; referenced objects are promoted to permanent only after that
//! commit, so storage never holds a permanent object without an owning row.

pub mod error;
pub mod handlers;
pub mod plugin;
pub mod services;

pub use error::ArticleError;
pub use plugin::ArticlesPlugin;
pub use services::{
    ArticleService, ArticleView, CreateArticle, MediaRecordStore, MediaSpec, MediaView,
    ReconcileReport, UpdateArticle,
};
