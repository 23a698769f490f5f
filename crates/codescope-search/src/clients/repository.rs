use super::{Paging, decode_source, execute, text_query};
use crate::SearchResult;
use crate::model::{RepositoryHit, RepositorySearchRequest, RepositorySearchResult};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_es::query::{page_offset, terms, total_pages};
use codescope_es::{EsSearchResponse, SearchBackend};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

const REPOSITORY_URI_FIELD: &str = "repository.uri";
const REPOSITORY_FIELDS: [&str; 2] = ["repository.name^3", "repository.uri"];

/// Search over indexed repositories
#[async_trait]
pub trait RepositorySearchClient: Send + Sync {
    async fn search(
        &self,
        request: &RepositorySearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult>;

    async fn suggest(
        &self,
        request: &RepositorySearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult>;
}

pub struct EsRepositorySearchClient {
    backend: Arc<dyn SearchBackend>,
    index: String,
    paging: Paging,
}

impl EsRepositorySearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>, paging: Paging) -> Self {
        Self {
            backend,
            index: index.into(),
            paging,
        }
    }

    fn build_query(request: &RepositorySearchRequest, match_type: &str, page_size: usize) -> Value {
        let text = text_query(
            &request.query,
            json!({
                "multi_match": {
                    "query": request.query,
                    "type": match_type,
                    "fields": REPOSITORY_FIELDS,
                }
            }),
        );

        json!({
            "from": page_offset(request.page, page_size),
            "size": page_size,
            "query": {
                "bool": {
                    "must": [text],
                    "filter": [terms(REPOSITORY_URI_FIELD, request.repo_scope.as_slice())],
                }
            }
        })
    }

    async fn run(
        &self,
        request: &RepositorySearchRequest,
        match_type: &str,
        page_size: usize,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult> {
        if request.repo_scope.is_empty() {
            debug!(correlation_id = %correlation_id, "Empty repository scope, skipping search");
            return Ok(RepositorySearchResult {
                page: request.page,
                ..RepositorySearchResult::default()
            });
        }

        let body = Self::build_query(request, match_type, page_size);
        let response = execute(self.backend.as_ref(), &self.index, body, correlation_id).await?;
        self.build_result(response, request.page, page_size, correlation_id)
    }

    fn build_result(
        &self,
        response: EsSearchResponse,
        page: usize,
        page_size: usize,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult> {
        let repositories = response
            .hits
            .hits
            .iter()
            .map(|hit| decode_source::<RepositoryHit>(hit, "/repository", &self.index, correlation_id))
            .collect::<SearchResult<Vec<_>>>()?;

        Ok(RepositorySearchResult {
            total: response.total(),
            took: response.took,
            page,
            total_page: total_pages(response.total(), page_size),
            repositories,
        })
    }
}

#[async_trait]
impl RepositorySearchClient for EsRepositorySearchClient {
    #[instrument(skip(self, request, correlation_id), fields(correlation_id = %correlation_id))]
    async fn search(
        &self,
        request: &RepositorySearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult> {
        self.run(request, "best_fields", self.paging.page_size, correlation_id)
            .await
    }

    #[instrument(skip(self, request, correlation_id), fields(correlation_id = %correlation_id))]
    async fn suggest(
        &self,
        request: &RepositorySearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<RepositorySearchResult> {
        self.run(
            request,
            "phrase_prefix",
            self.paging.suggestion_page_size,
            correlation_id,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_es::MockSearchBackend;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn request(page: usize, scope: &[&str]) -> RepositorySearchRequest {
        RepositorySearchRequest {
            query: "kibana".to_string(),
            page,
            repo_scope: scope.iter().map(ToString::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn test_search_pages_and_scopes_query() -> TestResult {
        let backend = Arc::new(
            MockSearchBackend::new().with_response(
                EsSearchResponse::from_sources(
                    ".code-repository",
                    vec![json!({ "repository": {
                        "uri": "github.com/elastic/kibana",
                        "name": "kibana",
                        "org": "elastic"
                    }})],
                )
                .with_total(45),
            ),
        );
        let client = EsRepositorySearchClient::new(
            Arc::<MockSearchBackend>::clone(&backend),
            ".code-repository",
            Paging::default(),
        );

        let result = client
            .search(&request(3, &["github.com/elastic/kibana"]), &CorrelationId::new())
            .await?;

        assert_eq!(result.total, 45);
        assert_eq!(result.page, 3);
        assert_eq!(result.total_page, 3);
        assert_eq!(result.repositories[0].name, "kibana");
        assert_eq!(result.repositories[0].org.as_deref(), Some("elastic"));

        let body = backend.last_body().ok_or("no request")?;
        assert_eq!(body["from"], 40);
        assert_eq!(body["size"], 20);
        assert_eq!(
            body["query"]["bool"]["filter"][0],
            json!({ "terms": { "repository.uri": ["github.com/elastic/kibana"] } })
        );
        assert_eq!(body["query"]["bool"]["must"][0]["multi_match"]["type"], "best_fields");
        Ok(())
    }

    #[tokio::test]
    async fn test_suggest_uses_prefix_match_and_suggestion_size() -> TestResult {
        let backend = Arc::new(MockSearchBackend::new());
        let client =
            EsRepositorySearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-repository", Paging::default());

        client.suggest(&request(1, &["a"]), &CorrelationId::new()).await?;

        let body = backend.last_body().ok_or("no request")?;
        assert_eq!(body["size"], 10);
        assert_eq!(body["query"]["bool"]["must"][0]["multi_match"]["type"], "phrase_prefix");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_scope_skips_backend() -> TestResult {
        let backend = Arc::new(MockSearchBackend::new());
        let client =
            EsRepositorySearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-repository", Paging::default());

        let result = client.search(&request(2, &[]), &CorrelationId::new()).await?;

        assert_eq!(result.total, 0);
        assert_eq!(result.page, 2);
        assert_eq!(backend.request_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let client = EsRepositorySearchClient::new(
            Arc::new(MockSearchBackend::new().with_search_failure()),
            ".code-repository",
            Paging::default(),
        );

        let result = client.search(&request(1, &["a"]), &CorrelationId::new()).await;
        assert!(matches!(result, Err(crate::SearchError::Backend { .. })));
    }
}
