use std::sync::Arc;

use crate::services::ArticleService;

pub struct ArticlesAppState {
    pub article_service: Arc<ArticleService>,
}

impl ArticlesAppState {
    pub fn new(article_service: Arc<ArticleService>) -> Self {
        Self { article_service }
    }
}
