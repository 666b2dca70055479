use articles_core::{Article, ArticleRepository, Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

pub struct SQLiteArticleRepository {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SQLiteArticleRepository {
    /// Open (creating if needed) the database file and bring the schema up to date.
    pub async fn connect(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::storage(e, "failed to create database directory"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::storage(e, "failed to connect to sqlite database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::storage(e, format!("failed to run migration {i}")))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn article_from_row(row: &SqliteRow) -> std::result::Result<Article, anyhow::Error> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
    })
}

#[async_trait]
impl ArticleRepository for SQLiteArticleRepository {
    async fn create(&self, article: &mut Article) -> Result<()> {
        let result = sqlx::query("INSERT INTO articles (title, created_at) VALUES (?, ?)")
            .bind(&article.title)
            .bind(article.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(layer = "repository", error = %e, "failed to create article");
                Error::storage(e, "failed to insert article")
            })?;

        article.id = result.last_insert_rowid();
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Article> {
        let row = sqlx::query("SELECT id, title, created_at FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(layer = "repository", id, error = %e, "database query failed");
                Error::storage(e, "failed to load article")
            })?;

        let Some(row) = row else {
            warn!(layer = "repository", id, "article not found");
            return Err(Error::NotFound(id));
        };

        article_from_row(&row).map_err(|e| {
            error!(layer = "repository", id, error = %e, "malformed article row");
            Error::Storage(e.context("failed to decode article row"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sqlite_repository() {
        // Create a temporary directory for the test database
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let repository = SQLiteArticleRepository::connect(&db_path).await.unwrap();
        assert!(repository.db_path().exists());

        let mut article = Article::new("Test Article");
        repository.create(&mut article).await.unwrap();
        assert_eq!(article.id, 1);

        let loaded = repository.get_by_id(article.id).await.unwrap();
        assert_eq!(loaded, article);

        let err = repository.get_by_id(42).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(42)));
    }

    #[tokio::test]
    async fn test_sqlite_repository_reopens_existing_data() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("articles.db");

        let mut article = Article::new("Persistent");
        {
            let repository = SQLiteArticleRepository::connect(&db_path).await.unwrap();
            repository.create(&mut article).await.unwrap();
            repository.pool.close().await;
        }

        let repository = SQLiteArticleRepository::connect(&db_path).await.unwrap();
        let loaded = repository.get_by_id(article.id).await.unwrap();
        assert_eq!(loaded.title, "Persistent");
        assert_eq!(loaded.created_at, article.created_at);
    }

    #[tokio::test]
    async fn test_sqlite_repository_closed_pool_is_storage_error() {
        let temp_dir = tempdir().unwrap();
        let repository = SQLiteArticleRepository::connect(&temp_dir.path().join("closed.db"))
            .await
            .unwrap();
        repository.pool.close().await;

        let mut article = Article::new("Never stored");
        let err = repository.create(&mut article).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(article.id, 0);

        let err = repository.get_by_id(1).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
