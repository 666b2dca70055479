use articles_core::{Article, ArticleRepository, Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

pub struct MemoryStore {
    articles: BTreeMap<i64, Article>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            articles: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, article: &mut Article) {
        article.id = self.next_id;
        self.next_id += 1;
        self.articles.insert(article.id, article.clone());
    }

    pub fn get(&self, id: i64) -> Option<&Article> {
        self.articles.get(&id)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-local repository. Ids start at 1 and are never reused.
#[derive(Clone, Default)]
pub struct InMemoryArticleRepository {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn create(&self, article: &mut Article) -> Result<()> {
        let mut store = self.store.write().await;
        store.insert(article);
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Article> {
        let store = self.store.read().await;
        match store.get(id) {
            Some(article) => Ok(article.clone()),
            None => {
                warn!(layer = "repository", id, "article not found");
                Err(Error::NotFound(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_repository() {
        let repository = InMemoryArticleRepository::new();

        let mut first = Article::new("First");
        let mut second = Article::new("Second");
        repository.create(&mut first).await.unwrap();
        repository.create(&mut second).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repository.len().await, 2);

        let loaded = repository.get_by_id(2).await.unwrap();
        assert_eq!(loaded, second);
    }

    #[tokio::test]
    async fn test_memory_repository_not_found() {
        let repository = InMemoryArticleRepository::new();
        assert!(repository.is_empty().await);

        let mut article = Article::new("Only");
        repository.create(&mut article).await.unwrap();

        for id in [0, 2, 999, -1] {
            let err = repository.get_by_id(id).await.unwrap_err();
            assert!(matches!(err, Error::NotFound(missing) if missing == id));
        }
    }
}
