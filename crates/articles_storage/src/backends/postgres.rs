use articles_core::{Article, ArticleRepository, Error, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{error, warn};

use crate::PostgresConfig;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            created_at: row.created_at,
        }
    }
}

pub struct PostgresArticleRepository {
    pool: PgPool,
}

impl PostgresArticleRepository {
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| Error::storage(e, "failed to connect to postgres"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::storage(e, format!("failed to run migration {i}")))?;
        }

        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PostgresArticleRepository {
    async fn create(&self, article: &mut Article) -> Result<()> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO articles (title, created_at) VALUES ($1, $2) RETURNING id",
        )
        .bind(&article.title)
        .bind(article.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(layer = "repository", error = %e, "failed to create article");
            Error::storage(e, "failed to insert article")
        })?;

        article.id = id;
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Article> {
        let row = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, title, created_at FROM articles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(layer = "repository", id, error = %e, "database query failed");
            Error::storage(e, "failed to load article")
        })?;

        match row {
            Some(row) => Ok(row.into()),
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

    /// Needs a local server with a `postgres`/`postgres` account, e.g.
    /// `cargo test -p articles_storage --features postgres -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_postgres_repository() {
        let config = PostgresConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "postgres".to_string(),
            max_connections: 2,
        };
        let repository = PostgresArticleRepository::connect(&config).await.unwrap();

        let mut article = Article::new("Test Article");
        repository.create(&mut article).await.unwrap();
        assert!(article.id > 0);

        let loaded = repository.get_by_id(article.id).await.unwrap();
        assert_eq!(loaded, article);

        let err = repository.get_by_id(i64::MAX).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_postgres_unreachable_is_storage_error() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/articles")
            .unwrap();
        let repository = PostgresArticleRepository::with_pool(pool);

        let mut article = Article::new("Never stored");
        let err = repository.create(&mut article).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(article.id, 0);

        let err = repository.get_by_id(1).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
