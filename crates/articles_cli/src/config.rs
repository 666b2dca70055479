use articles_storage::{PostgresConfig, StorageConfig, StorageKind};
use config::{Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Process configuration. Every field can be set from `config/default.*`
/// or from the environment variable of the same name upper-cased
/// (`HTTP_PORT`, `DB_HOST`, ...), the environment winning.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AppConfig {
    /// `local` switches logging to human-readable output.
    pub app_env: String,
    pub http_port: u16,
    pub storage: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_max_connections: u32,
    pub sqlite_path: PathBuf,
    pub db_connect_retries: u32,
    pub db_retry_delay_secs: u64,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_from(path, None)
    }

    /// Like [`AppConfig::load`], but reads variables from `env` instead of
    /// the process environment when given.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("http_port", 8080)?
            .set_default("storage", "memory")?
            .set_default("db_host", "localhost")?
            .set_default("db_port", 5432)?
            .set_default("db_user", "postgres")?
            .set_default("db_password", "")?
            .set_default("db_name", "articles")?
            .set_default("db_max_connections", 10)?
            .set_default("sqlite_path", "articles.db")?
            .set_default("db_connect_retries", 5)?
            .set_default("db_retry_delay_secs", 2)?
            .add_source(file)
            .add_source(Environment::default().source(env))
            .build()?;

        settings.try_deserialize()
    }

    pub fn is_local(&self) -> bool {
        self.app_env == "local"
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.http_port))
    }

    pub fn storage_config(&self) -> articles_core::Result<StorageConfig> {
        let config = match self.storage.parse::<StorageKind>()? {
            StorageKind::Memory => StorageConfig::Memory,
            StorageKind::SQLite => StorageConfig::SQLite {
                path: self.sqlite_path.clone(),
            },
            StorageKind::Postgres => StorageConfig::Postgres(PostgresConfig {
                host: self.db_host.clone(),
                port: self.db_port,
                user: self.db_user.clone(),
                password: self.db_password.clone(),
                database: self.db_name.clone(),
                max_connections: self.db_max_connections,
            }),
        };
        Ok(config)
    }

    /// A copy safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.db_password.is_empty() {
            copy.db_password = "<redacted>".to_string();
        }
        copy
    }
}
