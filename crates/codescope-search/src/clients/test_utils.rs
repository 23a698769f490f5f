//! Test utilities for search clients

use super::{
    CommitSearchClient, DocumentSearchClient, IntegrationsSearchClient, RepositorySearchClient,
    SymbolSearchClient,
};
use crate::model::{
    CommitSearchRequest, CommitSearchResult, DocumentSearchRequest, DocumentSearchResult,
    RepositorySearchRequest, RepositorySearchResult, ResolveSnippetsRequest, SearchRequest,
    SnippetSearchResult, SymbolSearchRequest, SymbolSearchResult,
};
use crate::{SearchError, SearchResult};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_es::EsError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One call received by [`MockSearchClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub request: SearchRequest,
}

/// Mock implementing every search client trait
///
/// Search and suggest calls return the configured results with the request's
/// page filled in. Snippet resolution echoes the request back as a single
/// snippet so callers can check ordering.
#[derive(Clone, Default)]
pub struct MockSearchClient {
    repositories: RepositorySearchResult,
    documents: DocumentSearchResult,
    symbols: SymbolSearchResult,
    commits: CommitSearchResult,
    fail_on_search: bool,
    fail_on_file: Option<String>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockSearchClient {
    /// Create a mock that returns empty results
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_repositories(mut self, result: RepositorySearchResult) -> Self {
        self.repositories = result;
        self
    }

    #[must_use]
    pub fn with_documents(mut self, result: DocumentSearchResult) -> Self {
        self.documents = result;
        self
    }

    #[must_use]
    pub fn with_symbols(mut self, result: SymbolSearchResult) -> Self {
        self.symbols = result;
        self
    }

    #[must_use]
    pub fn with_commits(mut self, result: CommitSearchResult) -> Self {
        self.commits = result;
        self
    }

    /// Configure every operation to fail
    #[must_use]
    pub const fn with_search_failure(mut self) -> Self {
        self.fail_on_search = true;
        self
    }

    /// Fail snippet resolution for one file path only
    #[must_use]
    pub fn with_snippet_failure(mut self, file_path: impl Into<String>) -> Self {
        self.fail_on_file = Some(file_path.into());
        self
    }

    /// All calls received so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(
        &self,
        operation: &'static str,
        request: SearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<()> {
        self.lock().push(RecordedCall { operation, request });
        tracing::debug!(correlation_id = %correlation_id, operation, "Mock search call");

        if self.fail_on_search {
            return Err(SearchError::backend(
                "mock",
                correlation_id,
                EsError::Status {
                    status: 503,
                    body: "mock client configured to fail".to_string(),
                },
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RepositorySearchClient for MockSearchClient {
    async fn search(
        &self,
        request: &RepositorySearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult> {
        self.record("repository.search", SearchRequest::Repository(request.clone()), correlation_id)?;
        Ok(RepositorySearchResult {
            page: request.page,
            ..self.repositories.clone()
        })
    }

    async fn suggest(
        &self,
        request: &RepositorySearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult> {
        self.record("repository.suggest", SearchRequest::Repository(request.clone()), correlation_id)?;
        Ok(RepositorySearchResult {
            page: request.page,
            ..self.repositories.clone()
        })
    }
}

#[async_trait]
impl DocumentSearchClient for MockSearchClient {
    async fn search(
        &self,
        request: &DocumentSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<DocumentSearchResult> {
        self.record("document.search", SearchRequest::Document(request.clone()), correlation_id)?;
        Ok(DocumentSearchResult {
            page: request.page,
            ..self.documents.clone()
        })
    }

    async fn suggest(
        &self,
        request: &DocumentSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<DocumentSearchResult> {
        self.record("document.suggest", SearchRequest::Document(request.clone()), correlation_id)?;
        Ok(DocumentSearchResult {
            page: request.page,
            ..self.documents.clone()
        })
    }
}

#[async_trait]
impl SymbolSearchClient for MockSearchClient {
    async fn suggest(
        &self,
        request: &SymbolSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<SymbolSearchResult> {
        self.record("symbol.suggest", SearchRequest::Symbol(request.clone()), correlation_id)?;
        Ok(SymbolSearchResult {
            page: request.page,
            ..self.symbols.clone()
        })
    }
}

#[async_trait]
impl CommitSearchClient for MockSearchClient {
    async fn search(
        &self,
        request: &CommitSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<CommitSearchResult> {
        self.record("commit.search", SearchRequest::Commit(request.clone()), correlation_id)?;
        Ok(CommitSearchResult {
            page: request.page,
            ..self.commits.clone()
        })
    }
}

#[async_trait]
impl IntegrationsSearchClient for MockSearchClient {
    async fn resolve_snippets(
        &self,
        request: &ResolveSnippetsRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<SnippetSearchResult>> {
        self.record(
            "integrations.resolve_snippets",
            SearchRequest::ResolveSnippets(request.clone()),
            correlation_id,
        )?;

        if self.fail_on_file.as_deref() == Some(request.file_path.as_str()) {
            return Err(SearchError::MalformedDocument {
                index: "mock".to_string(),
                message: format!("cannot resolve {}", request.file_path),
                correlation_id: correlation_id.clone(),
            });
        }

        Ok(vec![SnippetSearchResult {
            uri: request.repo_uris.first().cloned().unwrap_or_default(),
            file_path: request.file_path.clone(),
            language: None,
            revision: request.revision.clone(),
            line_num_start: request.line_num_start,
            line_num_end: request.line_num_end.unwrap_or(request.line_num_start),
            content: format!("{}:{}", request.file_path, request.line_num_start),
        }])
    }
}
