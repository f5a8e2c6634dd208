//! Error types for backend communication.

use std::path::PathBuf;

/// Failure to get a usable response at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered with HTTP status {code}")]
    Status { code: u16 },

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Incomplete response: {0}")]
    Incomplete(String),

    #[error("No response: {0}")]
    NoResponse(String),
}

/// Communication error type.
///
/// Transport failures and backend-reported failures are kept apart so the UI
/// can tell "server unreachable" from "server could not process the request".
#[derive(Debug, thiserror::Error)]
pub enum CommError {
    #[error("Communication error: {0}")]
    Transport(#[from] TransportError),

    #[error("Server error: {message}")]
    Server {
        message: String,
        stack_trace: Option<String>,
    },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

/// Result type for smo-comm operations.
pub type CommResult<T> = Result<T, CommError>;
