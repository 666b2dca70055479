pub mod error;
pub mod repository;
pub mod service;
pub mod types;

pub use error::{Error, Result};
pub use repository::ArticleRepository;
pub use service::{ArticleService, DefaultArticleService};
pub use types::{Article, ArticleResponse, CreateArticleRequest, CreateArticleResponse};
