//! Error sanitization utilities
//!
//! Logs the detailed error internally and hands back a message that is safe
//! to return to API callers.

use crate::CorrelationId;
use tracing::error;

/// Sanitize an error message for external consumption
///
/// Logs the detailed error against the request's correlation ID and returns
/// a generic message carrying that ID as a reference.
pub fn sanitize_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    correlation_id: &CorrelationId,
) -> String {
    error!(
        correlation_id = %correlation_id,
        error = %error,
        context = %context,
        "Internal error occurred"
    );

    format!("Operation failed (ref: {correlation_id})")
}

/// Sanitize an error with a fixed user-facing message
///
/// The detailed error only reaches the logs; the returned string is exactly
/// `user_message`.
pub fn sanitize_with_message<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
    correlation_id: &CorrelationId,
) -> String {
    error!(
        correlation_id = %correlation_id,
        error = %error,
        context = %context,
        "Internal error occurred"
    );

    user_message.to_string()
}
