//! Configuration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Not an absolute http(s) URL
    #[error("{field} must be an http(s) URL, got {url}")]
    InvalidUrl { field: String, url: String },

    /// Credentials embedded in a cluster URL would leak into logs
    #[error("{field} must not embed credentials; use elasticsearch.username/password")]
    CredentialsInUrl { field: String },

    /// Not a usable Elasticsearch index name or pattern
    #[error("{field} is not a valid index pattern ({index}): {reason}")]
    InvalidIndex {
        field: String,
        index: String,
        reason: &'static str,
    },

    #[error("Invalid port for {field}: {port}")]
    InvalidPort { field: String, port: u16 },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Failed to read configuration file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Generic { message: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
