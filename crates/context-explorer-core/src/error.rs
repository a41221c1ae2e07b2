//! Error types for Context Explorer.
//!
//! Manifest-level variants abort a page request and carry the exact text
//! shown to the caller. Entry-level variants are caught by the enricher and
//! rendered inline; they never reach the HTTP layer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Context Explorer library.
#[derive(Debug, Error)]
pub enum ExplorerError {
    // Manifest errors
    #[error("Context file not found at {url}")]
    ManifestNotFound { url: String },

    #[error("Error parsing context.json file: {message}")]
    ManifestParse { message: String },

    // Retrieval errors (per entry)
    #[error("Failed to fetch from retrieval service: {status}")]
    RetrievalStatus { status: u16 },

    #[error("Invalid entry: {message}")]
    InvalidEntry { message: String },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    // Cache errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Request errors
    #[error("Expected path /{{owner}}/{{repo}}[/{{page}}/{{branch}}], got {path}")]
    InvalidPath { path: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for Context Explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;

impl From<std::io::Error> for ExplorerError {
    fn from(err: std::io::Error) -> Self {
        ExplorerError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for ExplorerError {
    fn from(err: rusqlite::Error) -> Self {
        ExplorerError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Transport failures only. Timeouts need the configured bound and are
/// mapped by [`crate::network::HttpClient`].
impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        ExplorerError::Network {
            message: err.to_string(),
            cause: std::error::Error::source(&err).map(|s| s.to_string()),
        }
    }
}

impl ExplorerError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ExplorerError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// HTTP status code used when this error aborts a page request.
    ///
    /// - 400: malformed manifest or request path
    /// - 404: manifest not found upstream
    /// - 502: upstream unreachable or returned an unusable response
    /// - 504: upstream timed out
    /// - 500: everything else
    pub fn status_code(&self) -> u16 {
        match self {
            ExplorerError::ManifestParse { .. }
            | ExplorerError::InvalidPath { .. }
            | ExplorerError::InvalidEntry { .. } => 400,

            ExplorerError::ManifestNotFound { .. } => 404,

            ExplorerError::Network { .. } | ExplorerError::RetrievalStatus { .. } => 502,

            ExplorerError::Timeout(_) => 504,

            _ => 500,
        }
    }

    /// Whether this error belongs to a single manifest entry rather than
    /// the whole request.
    pub fn is_entry_level(&self) -> bool {
        matches!(
            self,
            ExplorerError::RetrievalStatus { .. } | ExplorerError::InvalidEntry { .. }
        )
    }
}
