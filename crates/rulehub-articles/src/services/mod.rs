mod article_service;
mod media_store;
mod types;

pub use article_service::ArticleService;
pub use media_store::MediaRecordStore;
pub use types::*;
