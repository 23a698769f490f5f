use super::{Paging, REPO_URI_FIELD, decode_source, execute, text_query};
use crate::SearchResult;
use crate::model::{CommitInfo, CommitSearchRequest, CommitSearchResult};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_es::SearchBackend;
use codescope_es::query::{page_offset, terms, total_pages};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

const MESSAGE_FIELD: &str = "message";

/// Search over commit messages
#[async_trait]
pub trait CommitSearchClient: Send + Sync {
    async fn search(
        &self,
        request: &CommitSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<CommitSearchResult>;
}

pub struct EsCommitSearchClient {
    backend: Arc<dyn SearchBackend>,
    index: String,
    paging: Paging,
}

impl EsCommitSearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>, paging: Paging) -> Self {
        Self {
            backend,
            index: index.into(),
            paging,
        }
    }

    fn search_query(&self, request: &CommitSearchRequest) -> Value {
        let page_size = self.paging.page_size;
        let mut filter = vec![terms(REPO_URI_FIELD, request.repo_scope.as_slice())];
        if !request.repo_filters.is_empty() {
            filter.push(terms(REPO_URI_FIELD, request.repo_filters.as_slice()));
        }

        json!({
            "from": page_offset(request.page, page_size),
            "size": page_size,
            "query": {
                "bool": {
                    "must": [text_query(
                        &request.query,
                        json!({ "match": { MESSAGE_FIELD: request.query } }),
                    )],
                    "filter": filter,
                }
            }
        })
    }
}

#[async_trait]
impl CommitSearchClient for EsCommitSearchClient {
    #[instrument(skip(self, request, correlation_id), fields(correlation_id = %correlation_id))]
    async fn search(
        &self,
        request: &CommitSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<CommitSearchResult> {
        if request.repo_scope.is_empty() {
            debug!(correlation_id = %correlation_id, "Empty repository scope, skipping search");
            return Ok(CommitSearchResult {
                page: request.page,
                ..CommitSearchResult::default()
            });
        }

        let body = self.search_query(request);
        let response = execute(self.backend.as_ref(), &self.index, body, correlation_id).await?;

        let commits = response
            .hits
            .hits
            .iter()
            .map(|hit| decode_source::<CommitInfo>(hit, "", &self.index, correlation_id))
            .collect::<SearchResult<Vec<_>>>()?;

        Ok(CommitSearchResult {
            total: response.total(),
            took: response.took,
            page: request.page,
            total_page: total_pages(response.total(), self.paging.page_size),
            commits,
        })
    }
}
