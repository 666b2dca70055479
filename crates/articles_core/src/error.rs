use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The caller's input violates a business rule.
    #[error("{0}")]
    Validation(String),

    #[error("article {0} not found")]
    NotFound(i64),

    /// The store could not complete the operation. The wrapped error keeps
    /// the driver failure along with whatever context each layer attached.
    #[error("Storage error: {0:#}")]
    Storage(#[source] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage<E, C>(err: E, context: C) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        C: Display + Send + Sync + 'static,
    {
        Self::Storage(anyhow::Error::new(err).context(context))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
