//! Search clients
//!
//! One trait per search kind, each with an Elasticsearch implementation that
//! turns the typed request into query DSL and the hits into result records.
//! Every query is restricted to the request's repository scope; an empty
//! scope returns an empty result without touching the backend.

pub mod commit;
pub mod document;
pub mod integrations;
pub mod repository;
pub mod symbol;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use commit::{CommitSearchClient, EsCommitSearchClient};
pub use document::{DocumentSearchClient, EsDocumentSearchClient};
pub use integrations::{EsIntegrationsSearchClient, IntegrationsSearchClient};
pub use repository::{EsRepositorySearchClient, RepositorySearchClient};
pub use symbol::{EsSymbolSearchClient, SymbolSearchClient};

use crate::{SearchError, SearchResult};
use codescope_common::CorrelationId;
use codescope_config::{ElasticsearchConfig, SearchConfig};
use codescope_es::{EsSearchResponse, Hit, SearchBackend};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Field holding the owning repository's URI in document, symbol and commit indices
pub(crate) const REPO_URI_FIELD: &str = "repoUri";

/// Index (or index pattern) per search kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    pub repository: String,
    pub document: String,
    pub symbol: String,
    pub commit: String,
}

impl IndexNames {
    pub fn from_config(config: &ElasticsearchConfig) -> Self {
        Self {
            repository: config.repository_index.clone(),
            document: config.document_index.clone(),
            symbol: config.symbol_index.clone(),
            commit: config.commit_index.clone(),
        }
    }
}

/// Page sizes for full searches and suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page_size: usize,
    pub suggestion_page_size: usize,
}

impl Paging {
    pub const fn from_config(config: &SearchConfig) -> Self {
        Self {
            page_size: config.page_size,
            suggestion_page_size: config.suggestion_page_size,
        }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// Run `body` against `index`, attaching the index and correlation id to failures
pub(crate) async fn execute(
    backend: &dyn SearchBackend,
    index: &str,
    body: Value,
    correlation_id: &CorrelationId,
) -> SearchResult<EsSearchResponse> {
    backend
        .search(index, body, correlation_id)
        .await
        .map_err(|e| SearchError::backend(index, correlation_id, e))
}

/// Free-text clause; a blank query matches everything in scope
pub(crate) fn text_query(query: &str, clause: Value) -> Value {
    if query.trim().is_empty() {
        json!({ "match_all": {} })
    } else {
        clause
    }
}

/// Decode a hit's `_source` (or the object at `pointer` inside it)
pub(crate) fn decode_source<T: DeserializeOwned>(
    hit: &Hit,
    pointer: &str,
    index: &str,
    correlation_id: &CorrelationId,
) -> SearchResult<T> {
    let value = if pointer.is_empty() {
        hit.source.clone()
    } else {
        hit.source.pointer(pointer).cloned().unwrap_or(Value::Null)
    };
    serde_json::from_value(value).map_err(|e| SearchError::MalformedDocument {
        index: index.to_string(),
        message: format!("document {}: {e}", hit.id),
        correlation_id: correlation_id.clone(),
    })
}
