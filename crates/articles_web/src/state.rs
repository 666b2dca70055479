use articles_core::ArticleService;
use std::sync::Arc;

use crate::metrics::Metrics;

pub struct AppState {
    pub article_service: Arc<dyn ArticleService>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(article_service: Arc<dyn ArticleService>, metrics: Metrics) -> Self {
        Self {
            article_service,
            metrics,
        }
    }
}
