//! Configuration validation
//!
//! Field-level checks used by the `Validate` impls in this crate. Index
//! checks follow Elasticsearch's naming rules, with `*` allowed so patterns
//! such as `.code-document-*` pass.

use crate::{ConfigError, ConfigResult};
use regex::Regex;
use std::sync::OnceLock;

/// `scheme://[userinfo@]host[...]`; `None` if the pattern fails to compile
fn cluster_url_regex() -> Option<&'static Regex> {
    static CLUSTER_URL: OnceLock<Option<Regex>> = OnceLock::new();
    CLUSTER_URL
        .get_or_init(|| Regex::new(r"^https?://(?P<userinfo>[^@/\s]+@)?[^\s/$.?#@][^\s@]*$").ok())
        .as_ref()
}

/// Characters Elasticsearch rejects in index names
const FORBIDDEN_INDEX_CHARS: [char; 10] = ['\\', '/', '?', '"', '<', '>', '|', ' ', '#', ':'];

pub trait Validate {
    /// Validate this configuration object
    ///
    /// # Errors
    /// Returns validation errors if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Validate a cluster URL: http(s), a host, no embedded credentials
///
/// # Errors
/// Returns `ConfigError::InvalidUrl` or `ConfigError::CredentialsInUrl`
pub fn validate_url(url: &str, field_name: &str) -> ConfigResult<()> {
    let invalid = || ConfigError::InvalidUrl {
        field: field_name.to_string(),
        url: url.to_string(),
    };

    let Some(regex) = cluster_url_regex() else {
        return if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(invalid())
        };
    };

    let captures = regex.captures(url).ok_or_else(invalid)?;
    if captures.name("userinfo").is_some() {
        return Err(ConfigError::CredentialsInUrl {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

/// Validate an index name or comma-separated list of index patterns
///
/// # Errors
/// Returns `ConfigError::InvalidIndex` naming the first broken rule
pub fn validate_index_pattern(pattern: &str, field_name: &str) -> ConfigResult<()> {
    let fail = |reason: &'static str| ConfigError::InvalidIndex {
        field: field_name.to_string(),
        index: pattern.to_string(),
        reason,
    };

    if pattern.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: field_name.to_string(),
        });
    }

    for index in pattern.split(',') {
        if index.is_empty() {
            return Err(fail("empty entry in list"));
        }
        if index == "." || index == ".." {
            return Err(fail("reserved name"));
        }
        if index.starts_with(['-', '_', '+']) {
            return Err(fail("must not start with '-', '_' or '+'"));
        }
        if index.chars().any(char::is_uppercase) {
            return Err(fail("must be lowercase"));
        }
        if index.contains(FORBIDDEN_INDEX_CHARS) {
            return Err(fail("contains a forbidden character"));
        }
    }
    Ok(())
}

/// Validate a port number
///
/// # Errors
/// Returns `ConfigError::InvalidPort` if port is 0
pub fn validate_port(port: u16, field_name: &str) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort {
            field: field_name.to_string(),
            port,
        });
    }
    Ok(())
}

/// Validate `min <= value <= max`
///
/// # Errors
/// Returns `ConfigError::OutOfRange`
pub fn validate_range(value: u64, min: u64, max: u64, field_name: &str) -> ConfigResult<()> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        field: field_name.to_string(),
        value,
        min,
        max,
    })
}

/// # Errors
/// Returns `ConfigError::MissingField` if the string is empty or whitespace-only
pub fn validate_non_empty(value: &str, field_name: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: field_name.to_string(),
        });
    }
    Ok(())
}
