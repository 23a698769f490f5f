//! Query-string parsing for the code search routes
//!
//! Malformed values never reject a request; each parameter falls back to its
//! default instead.

use codescope_search::RepoScope;
use std::borrow::Cow;

/// Parsed `q`, `p`, `langs`, `repos` and `repoScope` parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchParams {
    pub query: String,
    pub page: usize,
    pub langs: Vec<String>,
    pub repos: Vec<String>,
    pub repo_scope: RepoScope,
}

impl SearchParams {
    /// Parse decoded query-string pairs
    ///
    /// `repoScope` may repeat; every other key uses its first occurrence.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let scopes = pairs
            .iter()
            .filter(|(k, _)| k == "repoScope")
            .map(|(_, v)| v.clone())
            .collect();

        Self {
            query: first("q").unwrap_or_default().to_string(),
            page: parse_page(first("p")),
            langs: first("langs").map(split_list).unwrap_or_default(),
            repos: first("repos")
                .map(|raw| split_list(&decode_component(raw)))
                .unwrap_or_default(),
            repo_scope: RepoScope::from_values(scopes),
        }
    }
}

/// 1-based page number; absent, non-numeric or zero input means page 1
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|p| p.trim().parse::<usize>().ok())
        .filter(|&page| page >= 1)
        .unwrap_or(1)
}

/// Comma-separated list, empty segments dropped
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Percent-decode once more; the raw value is kept when it does not decode
fn decode_component(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
