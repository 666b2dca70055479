use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::repository::ArticleRepository;
use crate::types::{Article, ArticleResponse, CreateArticleRequest, CreateArticleResponse};
use crate::{Error, Result};

#[async_trait]
pub trait ArticleService: Send + Sync {
    /// Validate and persist a new article, returning its id and timestamp.
    async fn create(&self, request: CreateArticleRequest) -> Result<CreateArticleResponse>;

    /// Fetch an article by id.
    async fn get_by_id(&self, id: i64) -> Result<ArticleResponse>;
}

pub struct DefaultArticleService {
    repository: Arc<dyn ArticleRepository>,
}

impl DefaultArticleService {
    pub fn new(repository: Arc<dyn ArticleRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ArticleService for DefaultArticleService {
    async fn create(&self, request: CreateArticleRequest) -> Result<CreateArticleResponse> {
        if request.title.is_empty() {
            warn!(layer = "service", "creation attempt with empty title");
            return Err(Error::validation("title cannot be empty"));
        }

        let mut article = Article::new(request.title);
        info!(layer = "service", title = %article.title, "creating new article");

        self.repository.create(&mut article).await?;

        info!(layer = "service", id = article.id, "article created successfully");
        Ok(CreateArticleResponse::from(&article))
    }

    async fn get_by_id(&self, id: i64) -> Result<ArticleResponse> {
        match self.repository.get_by_id(id).await {
            Ok(article) => Ok(article.into()),
            Err(e) => {
                warn!(layer = "service", id, error = %e, "failed to retrieve article");
                Err(e)
            }
        }
    }
}
