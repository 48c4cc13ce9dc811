//! Error types for feedstore.

use thiserror::Error;

/// Result type alias using feedstore's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for feedstore operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied malformed input. Never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A by-id write targeted a row that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Predicate construction hit an internal invariant (e.g. too many bound parameters).
    #[error("Predicate build error: {0}")]
    PredicateBuild(String),

    /// A query failed; tagged with the operation that issued it.
    ///
    /// The message carries the backend error only, never row values.
    #[error("{op} failed: {source}")]
    Query {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A bounded query exceeded its deadline.
    #[error("{op} timed out after {timeout_ms}ms")]
    Timeout { op: &'static str, timeout_ms: u64 },

    /// Pool, migration or other untagged database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored value could not be decoded (e.g. corrupt scraper config).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Tag a backend failure with the operation name.
    pub fn query(op: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
        move |source| Error::Query { op, source }
    }

    /// Whether this error is a caller-side validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    /// Whether this error is a bounded-query timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
