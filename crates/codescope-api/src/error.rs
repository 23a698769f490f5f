//! Structured API error handling for the codescope API.
//!
//! Every variant carries the request's correlation id, which is returned in
//! the JSON body and the `X-Correlation-ID` header. Internal detail never
//! reaches the body; handlers log it through
//! [`codescope_common::error_sanitizer`] before building the error.
//!
//! # Usage
//!
//! ```rust
//! use codescope_api::{ApiError, ApiResult};
//! use codescope_common::CorrelationId;
//!
//! async fn search_handler() -> ApiResult<Vec<String>> {
//!     Err(ApiError::SearchException {
//!         correlation_id: CorrelationId::new(),
//!     })
//! }
//! ```

use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use codescope_common::CorrelationId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Fixed message of every failed code search
pub const SEARCH_EXCEPTION_MESSAGE: &str = "Search Exception";

#[derive(Debug, Error)]
pub enum ApiError {
    /// A code search or suggestion failed for any reason.
    ///
    /// Scope lookup and client failures render identically.
    #[error("Search Exception")]
    SearchException { correlation_id: CorrelationId },

    /// One of the snippet lookups in a batch failed
    #[error("Snippet resolution failed: {reason}")]
    SnippetResolutionFailed {
        reason: String,
        correlation_id: CorrelationId,
    },

    /// The search cluster is unreachable or overloaded
    #[error(
        "Search service unavailable (correlation: {correlation_id}, timeout: {}ms)",
        timeout_duration.as_millis()
    )]
    SearchServiceUnavailable {
        timeout_duration: Duration,
        correlation_id: CorrelationId,
    },

    /// The request ran past its time budget
    #[error(
        "Request timed out after {}ms (correlation: {correlation_id})",
        timeout_duration.as_millis()
    )]
    RequestTimeout {
        timeout_duration: Duration,
        correlation_id: CorrelationId,
    },

    /// Request parameters failed validation
    #[error("Request validation failed: {message} (correlation: {correlation_id})")]
    ValidationError {
        message: String,
        field: Option<String>,
        correlation_id: CorrelationId,
    },

    #[error("Internal server error (correlation: {correlation_id})")]
    InternalServerError { correlation_id: CorrelationId },
}

/// Error response sent to API clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Correlation ID for tracking and support
    #[schema(value_type = String)]
    pub correlation_id: CorrelationId,
    /// Optional additional details
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// When to retry (for transient errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ApiError {
    /// Build a [`ApiError::SearchException`], logging the cause
    pub fn search_exception<E: std::fmt::Display>(
        cause: E,
        operation: &str,
        correlation_id: &CorrelationId,
    ) -> Self {
        codescope_common::sanitize_with_message(
            cause,
            operation,
            SEARCH_EXCEPTION_MESSAGE,
            correlation_id,
        );
        Self::SearchException {
            correlation_id: correlation_id.clone(),
        }
    }

    pub const fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::SearchException { correlation_id }
            | Self::SnippetResolutionFailed { correlation_id, .. }
            | Self::SearchServiceUnavailable { correlation_id, .. }
            | Self::RequestTimeout { correlation_id, .. }
            | Self::ValidationError { correlation_id, .. }
            | Self::InternalServerError { correlation_id } => correlation_id,
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::SearchException { .. }
            | Self::SnippetResolutionFailed { .. }
            | Self::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SearchServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::RequestTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Machine-readable code for the `error` field
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SearchException { .. } => "SEARCH_EXCEPTION",
            Self::SnippetResolutionFailed { .. } => "SNIPPET_RESOLUTION_FAILED",
            Self::SearchServiceUnavailable { .. } => "SEARCH_SERVICE_UNAVAILABLE",
            Self::RequestTimeout { .. } => "REQUEST_TIMEOUT",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::SearchServiceUnavailable { .. } => Some(60),
            Self::RequestTimeout { .. } => Some(30),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let correlation_id = self.correlation_id();

        if status.is_server_error() {
            error!(correlation_id = %correlation_id, error = %self, "Request failed");
        } else {
            warn!(correlation_id = %correlation_id, error = %self, "Client error");
        }

        let details = match &self {
            Self::ValidationError {
                field: Some(field), ..
            } => Some(serde_json::json!({ "field": field })),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            correlation_id: correlation_id.clone(),
            details,
            retry_after: self.retry_after(),
        };

        let mut response = (status, Json(error_response)).into_response();

        if let Ok(header_value) = correlation_id.to_string().parse() {
            response
                .headers_mut()
                .insert(CORRELATION_ID_HEADER, header_value);
        }

        response
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
