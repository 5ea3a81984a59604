use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Venue error: {0}")]
    Venue(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors the caller may retry without any state cleanup.
    /// Timeouts do not imply the underlying task is dead.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
