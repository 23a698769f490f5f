//! Repository scope resolution
//!
//! A request may only search repositories the caller is permitted to see.
//! The permitted set comes from an injected [`ReferenceLookup`]; an optional
//! caller restriction narrows it further.

use crate::{SearchError, SearchResult};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_es::SearchBackend;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller-supplied narrowing of the permitted repositories
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RepoScope {
    /// No restriction; the whole permitted set applies
    #[default]
    Unrestricted,
    /// A single comma-separated value
    Csv(String),
    /// Several values, each one repository URI
    List(Vec<String>),
}

impl RepoScope {
    /// Classify the raw occurrences of a `repoScope` parameter
    pub fn from_values(mut values: Vec<String>) -> Self {
        match values.len() {
            0 => Self::Unrestricted,
            1 => values.pop().map_or(Self::Unrestricted, Self::Csv),
            _ => Self::List(values),
        }
    }

    fn restriction(&self) -> Option<HashSet<&str>> {
        match self {
            Self::Unrestricted => None,
            Self::Csv(raw) => Some(raw.split(',').collect()),
            Self::List(values) => Some(values.iter().map(String::as_str).collect()),
        }
    }
}

/// Intersect `permitted` with the caller restriction
///
/// The result keeps the order of `permitted` and never contains a URI
/// outside it. An empty intersection is a valid, empty scope.
pub fn resolve_scope(restriction: &RepoScope, permitted: Vec<String>) -> Vec<String> {
    match restriction.restriction() {
        None => permitted,
        Some(allowed) => permitted
            .into_iter()
            .filter(|uri| allowed.contains(uri.as_str()))
            .collect(),
    }
}

/// Source of the repository URIs a caller may search
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn find_references(&self, correlation_id: &CorrelationId) -> SearchResult<Vec<String>>;
}

/// Fixed permitted set, from configuration or tests
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceLookup {
    uris: Vec<String>,
}

impl StaticReferenceLookup {
    pub fn new<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uris: uris.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ReferenceLookup for StaticReferenceLookup {
    async fn find_references(&self, _correlation_id: &CorrelationId) -> SearchResult<Vec<String>> {
        Ok(self.uris.clone())
    }
}

/// Permitted set read from the references index
///
/// Every document in the index contributes its `uri` field.
pub struct EsReferenceLookup {
    backend: Arc<dyn SearchBackend>,
    index: String,
    max_references: usize,
}

impl EsReferenceLookup {
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>, max_references: usize) -> Self {
        Self {
            backend,
            index: index.into(),
            max_references,
        }
    }
}

#[async_trait]
impl ReferenceLookup for EsReferenceLookup {
    async fn find_references(&self, correlation_id: &CorrelationId) -> SearchResult<Vec<String>> {
        let body = json!({
            "size": self.max_references,
            "_source": ["uri"],
            "query": { "match_all": {} }
        });

        let response = self
            .backend
            .search(&self.index, body, correlation_id)
            .await
            .map_err(|e| SearchError::ReferenceLookupFailed {
                message: e.to_string(),
                correlation_id: correlation_id.clone(),
            })?;

        let mut seen = HashSet::new();
        let mut uris = Vec::with_capacity(response.hits.hits.len());
        for hit in response.hits.hits {
            match hit.source.get("uri").and_then(|v| v.as_str()) {
                Some(uri) => {
                    if seen.insert(uri.to_string()) {
                        uris.push(uri.to_string());
                    }
                }
                None => warn!(
                    correlation_id = %correlation_id,
                    id = %hit.id,
                    "Reference document without uri skipped"
                ),
            }
        }

        debug!(correlation_id = %correlation_id, count = uris.len(), "Loaded references");
        Ok(uris)
    }
}

/// Resolves request scopes against an injected reference lookup
#[derive(Clone)]
pub struct ScopeResolver {
    lookup: Arc<dyn ReferenceLookup>,
}

impl ScopeResolver {
    pub fn new(lookup: Arc<dyn ReferenceLookup>) -> Self {
        Self { lookup }
    }

    /// Permitted repositories narrowed by `restriction`
    ///
    /// # Errors
    /// Returns the lookup's error if the permitted set cannot be loaded
    pub async fn resolve(
        &self,
        restriction: &RepoScope,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<String>> {
        let permitted = self.lookup.find_references(correlation_id).await?;
        Ok(resolve_scope(restriction, permitted))
    }

    /// The full permitted set
    ///
    /// # Errors
    /// Returns the lookup's error if the permitted set cannot be loaded
    pub async fn permitted(&self, correlation_id: &CorrelationId) -> SearchResult<HashSet<String>> {
        Ok(self
            .lookup
            .find_references(correlation_id)
            .await?
            .into_iter()
            .collect())
    }
}
