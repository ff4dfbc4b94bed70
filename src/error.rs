//! Error types shared by the query, search and queue modules.

use thiserror::Error;

/// Error type returned by external engine and writer collaborators.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;

/// Errors produced by sieve.
///
/// Compile-level problems never show up here: a blank or malformed restriction
/// compiles to an empty string instead.
#[derive(Debug, Error)]
pub enum SieveError {
    /// The engine rejected or failed to execute a compiled query.
    #[error("search failed for query '{query}': {source}")]
    SearchFailed {
        /// The compiled query text that was executed.
        query: String,
        #[source]
        source: EngineError,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SieveError {
    pub fn search_failed(query: impl Into<String>, source: impl Into<EngineError>) -> Self {
        SieveError::SearchFailed {
            query: query.into(),
            source: source.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SieveError::InvalidArgument(msg.into())
    }

    /// The query text attached to a search failure, if any.
    pub fn query(&self) -> Option<&str> {
        match self {
            SieveError::SearchFailed { query, .. } => Some(query),
            _ => None,
        }
    }
}
