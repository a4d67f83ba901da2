//! Object storage for article media
//!
//! Wraps an S3-compatible bucket behind the [`ObjectStore`] trait:
//! - issuing presigned upload targets under fresh temporary keys
//! - promoting uploaded objects to permanent once an article owns them
//! - resolving download URLs (presigned or stable public)
//!
//! The `/media` routes let clients obtain upload targets and download URLs.

pub mod error;
pub mod handlers;
pub mod keys;
pub mod plugin;
pub mod services;
pub mod test_utils;

pub use error::StorageError;
pub use keys::{display_name, storage_key_from_reference, validate_key};
pub use plugin::StoragePlugin;
pub use services::{
    DownloadUrlMode, ObjectStatus, ObjectStore, S3ObjectStore, UploadTarget, STATUS_PERMANENT,
    STATUS_TAG, STATUS_TEMPORARY,
};
