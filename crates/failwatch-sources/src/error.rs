//! Error types for the external collaborators
//!
//! - Search backend retrieval (fatal to a run)
//! - Ticket filing (fatal to one family only)
//! - Assignee directory loading

use std::path::PathBuf;

/// Search backend errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("search backend returned {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("cannot decode search response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client configuration is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Ticket tracker errors
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Tracker answered with a non-success status
    #[error("ticket tracker returned {status} for {operation}: {body}")]
    Api {
        /// Which call failed
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("cannot decode tracker response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Board has no sprint in the active state
    #[error("board {board_id} has no active sprint")]
    NoActiveSprint {
        /// Board that was queried
        board_id: u64,
    },

    /// Client configuration is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TicketError {
    /// Create API error for an operation
    pub fn api(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            operation,
            status,
            body: body.into(),
        }
    }
}

/// Assignee directory errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not a JSON array of directory entries
    #[error("invalid directory file {path}: {source}")]
    Json {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl DirectoryError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create JSON error for path
    pub fn json_error(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for search operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type alias for ticket operations
pub type TicketResult<T> = Result<T, TicketError>;
