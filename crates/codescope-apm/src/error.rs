use codescope_common::CorrelationId;
use codescope_es::EsError;
use thiserror::Error;

/// Result type for APM operations
pub type ApmResult<T> = std::result::Result<T, ApmError>;

#[derive(Error, Debug)]
pub enum ApmError {
    #[error("Transaction search failed (correlation: {correlation_id}): {source}")]
    Backend {
        correlation_id: CorrelationId,
        #[source]
        source: EsError,
    },

    #[error("Response lacks aggregation '{name}' (correlation: {correlation_id})")]
    MissingAggregation {
        name: String,
        correlation_id: CorrelationId,
    },
}

impl ApmError {
    pub const fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::Backend { correlation_id, .. } | Self::MissingAggregation { correlation_id, .. } => {
                correlation_id
            }
        }
    }

    /// Whether the failure is the cluster being unreachable or overloaded
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Backend {
                source: EsError::Transport(_) | EsError::Status { status: 429 | 502..=504, .. },
                ..
            }
        )
    }
}
