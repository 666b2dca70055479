use articles_core::{ArticleRepository, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

/// Which store backs the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    SQLite,
    Postgres,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::SQLite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(Error::Config(format!("unknown storage backend: {other}"))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::SQLite => "sqlite",
            Self::Postgres => "postgres",
        };
        f.write_str(name)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

// Keeps the password out of logs.
impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    SQLite { path: PathBuf },
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn kind(&self) -> StorageKind {
        match self {
            Self::Memory => StorageKind::Memory,
            Self::SQLite { .. } => StorageKind::SQLite,
            Self::Postgres(_) => StorageKind::Postgres,
        }
    }

    /// Reject settings no connection attempt could succeed with.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Memory => Ok(()),
            Self::SQLite { path } if path.as_os_str().is_empty() => {
                Err(Error::Config("sqlite_path must not be empty".to_string()))
            }
            Self::SQLite { .. } => Ok(()),
            Self::Postgres(pg) if pg.host.is_empty() || pg.database.is_empty() => {
                Err(Error::Config("db_host and db_name must not be empty".to_string()))
            }
            Self::Postgres(pg) if pg.max_connections == 0 => {
                Err(Error::Config("db_max_connections must be at least 1".to_string()))
            }
            Self::Postgres(_) => Ok(()),
        }
    }
}

/// Connect the configured backend and run its migrations.
pub async fn create_repository(config: &StorageConfig) -> Result<Arc<dyn ArticleRepository>> {
    config.validate()?;

    match config {
        StorageConfig::Memory => Ok(Arc::new(InMemoryArticleRepository::new())),
        #[cfg(feature = "sqlite")]
        StorageConfig::SQLite { path } => {
            Ok(Arc::new(SQLiteArticleRepository::connect(path).await?))
        }
        #[cfg(feature = "postgres")]
        StorageConfig::Postgres(postgres) => {
            Ok(Arc::new(PostgresArticleRepository::connect(postgres).await?))
        }
        #[allow(unreachable_patterns)]
        other => Err(Error::Config(format!(
            "storage backend '{}' is not compiled in; enable the '{}' feature",
            other.kind(),
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use articles_core::Article;

    #[test]
    fn parses_storage_kinds() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("SQLite".parse::<StorageKind>().unwrap(), StorageKind::SQLite);
        assert_eq!("postgresql".parse::<StorageKind>().unwrap(), StorageKind::Postgres);
        assert!(matches!("mongo".parse::<StorageKind>(), Err(Error::Config(_))));
    }

    fn postgres_config() -> PostgresConfig {
        PostgresConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "s3cret".to_string(),
            database: "articles".to_string(),
            max_connections: 1,
        }
    }

    #[test]
    fn debug_redacts_postgres_password() {
        let config = StorageConfig::Postgres(postgres_config());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("localhost"));
    }

    #[tokio::test]
    async fn creates_memory_repository() {
        let repository = create_repository(&StorageConfig::Memory).await.unwrap();
        let mut article = Article::new("From factory");
        repository.create(&mut article).await.unwrap();
        assert_eq!(repository.get_by_id(article.id).await.unwrap().title, "From factory");
    }

    #[tokio::test]
    async fn unusable_settings_are_config_errors() {
        let sqlite = StorageConfig::SQLite { path: PathBuf::new() };
        assert!(matches!(create_repository(&sqlite).await, Err(Error::Config(_))));

        let no_pool = StorageConfig::Postgres(PostgresConfig {
            max_connections: 0,
            ..postgres_config()
        });
        assert!(matches!(create_repository(&no_pool).await, Err(Error::Config(_))));

        let no_host = StorageConfig::Postgres(PostgresConfig {
            host: String::new(),
            ..postgres_config()
        });
        assert!(matches!(no_host.validate(), Err(Error::Config(_))));
        assert!(StorageConfig::Postgres(postgres_config()).validate().is_ok());
        assert!(StorageConfig::Memory.validate().is_ok());
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn missing_backend_feature_is_config_error() {
        let config = StorageConfig::Postgres(postgres_config());
        assert!(matches!(create_repository(&config).await, Err(Error::Config(_))));
    }
}
