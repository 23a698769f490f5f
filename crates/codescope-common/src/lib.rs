//! Common utilities shared across codescope crates
//!
//! Correlation IDs for request tracking, one-time environment setup and
//! helpers that keep internal error detail out of API responses.

pub mod correlation;
pub mod error_sanitizer;
pub mod init;

pub use correlation::CorrelationId;
pub use error_sanitizer::{sanitize_error, sanitize_with_message};
pub use init::initialize_environment;
