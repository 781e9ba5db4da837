//! Error type for the ranking core.
//!
//! The batch job turns most of these into per-keyword failure outcomes.
//! The HTTP layer maps each variant to a status code (see [`crate::server`]).

use thiserror::Error;

/// Errors raised by the search client, the record store, and the keyword
/// operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The search API key or engine id is not present in the environment.
    #[error("Google API credentials not configured")]
    ConfigurationMissing,

    /// The outbound search call failed (transport, HTTP status, or body).
    #[error("Failed to fetch search results: {0}")]
    SearchRequestFailed(String),

    /// The record store could not read or write.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Caller input was rejected; nothing was written.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
