//! Error types for Elasticsearch access

use thiserror::Error;

/// Result type alias for backend operations
pub type EsResult<T> = Result<T, EsError>;

/// Errors that can occur while talking to Elasticsearch
#[derive(Error, Debug)]
pub enum EsError {
    /// The request never produced a response (connect, timeout, TLS)
    #[error("Elasticsearch transport error: {0}")]
    Transport(String),

    /// Elasticsearch answered with a non-success status
    #[error("Elasticsearch returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape
    #[error("Failed to decode Elasticsearch response: {0}")]
    Decode(String),

    /// The backend could not be constructed from configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for EsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for EsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
