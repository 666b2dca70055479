use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Store-assigned identifier, 0 until the article has been persisted.
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Build an unsaved article stamped with the current time.
    ///
    /// The timestamp is truncated to microseconds, the finest precision every
    /// backend can store, so what the caller sees on creation is exactly what
    /// a later read returns.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateArticleResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Article> for CreateArticleResponse {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            created_at: article.created_at,
        }
    }
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            created_at: article.created_at,
        }
    }
}
