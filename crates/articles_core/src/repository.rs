use async_trait::async_trait;

use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a new article and write the store-generated id back into it.
    ///
    /// Fails with [`Error::Storage`](crate::Error::Storage) on any write
    /// failure, in which case `article.id` is left untouched.
    async fn create(&self, article: &mut Article) -> Result<()>;

    /// Load an article by id, failing with
    /// [`Error::NotFound`](crate::Error::NotFound) when no record matches.
    async fn get_by_id(&self, id: i64) -> Result<Article>;
}
