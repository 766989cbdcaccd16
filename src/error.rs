//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the store, the cache facade and the page cache.
///
/// A missing key is never an error; lookups return `None` instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Stored value cannot be read as an integer
    #[error("Value is not an integer: {0}")]
    TypeMismatch(String),

    /// Operation against a key holding the wrong kind of value
    #[error("Wrong type for key: {0}")]
    WrongType(String),

    /// Increment would leave the i64 range
    #[error("Increment would overflow: {0}")]
    Overflow(String),

    /// Stored bytes cannot be decoded by the requested projection
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Invalid key, value or TTL
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The page fetcher failed
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Fetch(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
