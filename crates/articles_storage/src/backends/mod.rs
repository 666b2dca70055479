pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryArticleRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SQLiteArticleRepository;

#[cfg(feature = "postgres")]
pub use postgres::PostgresArticleRepository;
