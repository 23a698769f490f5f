use codescope_common::CorrelationId;
use codescope_es::EsError;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Search-specific error types with correlation ID support
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search backend failed on index '{index}' (correlation: {correlation_id}): {source}")]
    Backend {
        index: String,
        correlation_id: CorrelationId,
        #[source]
        source: EsError,
    },

    #[error("Reference lookup failed (correlation: {correlation_id}): {message}")]
    ReferenceLookupFailed {
        message: String,
        correlation_id: CorrelationId,
    },

    #[error("Unexpected document shape in '{index}' (correlation: {correlation_id}): {message}")]
    MalformedDocument {
        index: String,
        message: String,
        correlation_id: CorrelationId,
    },

    #[error("Backend error: {0}")]
    BackendError(#[from] EsError),
}

impl SearchError {
    /// Wrap a backend failure with the index and request it belongs to
    pub fn backend(index: &str, correlation_id: &CorrelationId, source: EsError) -> Self {
        Self::Backend {
            index: index.to_string(),
            correlation_id: correlation_id.clone(),
            source,
        }
    }

    /// Correlation id of the failing request, if one was attached
    pub const fn correlation_id(&self) -> Option<&CorrelationId> {
        match self {
            Self::Backend { correlation_id, .. }
            | Self::ReferenceLookupFailed { correlation_id, .. }
            | Self::MalformedDocument { correlation_id, .. } => Some(correlation_id),
            Self::BackendError(_) => None,
        }
    }
}
