use super::{Paging, REPO_URI_FIELD, execute, text_query};
use crate::model::{DocumentHit, DocumentSearchRequest, DocumentSearchResult, FacetCount};
use crate::{SearchError, SearchResult};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_es::query::{page_offset, terms, total_pages};
use codescope_es::{EsSearchResponse, Hit, SearchBackend};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

const CONTENT_FIELD: &str = "content";
const PATH_FIELD: &str = "path";
const LANGUAGE_FIELD: &str = "language";

const REPO_FACET: &str = "repoUri";
const LANGUAGE_FACET: &str = "language";

/// Full-text search over source files
#[async_trait]
pub trait DocumentSearchClient: Send + Sync {
    async fn search(
        &self,
        request: &DocumentSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<DocumentSearchResult>;

    async fn suggest(
        &self,
        request: &DocumentSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<DocumentSearchResult>;
}

pub struct EsDocumentSearchClient {
    backend: Arc<dyn SearchBackend>,
    index: String,
    paging: Paging,
}

impl EsDocumentSearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>, paging: Paging) -> Self {
        Self {
            backend,
            index: index.into(),
            paging,
        }
    }

    /// Full search body
    ///
    /// Language and repository filters go into `post_filter` so the facet
    /// counts still describe the whole scoped result set.
    fn search_query(&self, request: &DocumentSearchRequest) -> Value {
        let page_size = self.paging.page_size;
        let text = text_query(
            &request.query,
            json!({
                "multi_match": {
                    "query": request.query,
                    "fields": [CONTENT_FIELD, PATH_FIELD],
                }
            }),
        );

        let mut post_filters = Vec::new();
        if !request.lang_filters.is_empty() {
            post_filters.push(terms(LANGUAGE_FIELD, request.lang_filters.as_slice()));
        }
        if !request.repo_filters.is_empty() {
            post_filters.push(terms(REPO_URI_FIELD, request.repo_filters.as_slice()));
        }

        let mut body = json!({
            "from": page_offset(request.page, page_size),
            "size": page_size,
            "_source": [REPO_URI_FIELD, PATH_FIELD, LANGUAGE_FIELD],
            "query": {
                "bool": {
                    "must": [text],
                    "filter": [terms(REPO_URI_FIELD, request.repo_scope.as_slice())],
                }
            },
            "aggs": {
                REPO_FACET: { "terms": { "field": REPO_URI_FIELD } },
                LANGUAGE_FACET: { "terms": { "field": LANGUAGE_FIELD } },
            },
            "highlight": {
                "fields": { CONTENT_FIELD: {} }
            }
        });

        if !post_filters.is_empty() {
            body["post_filter"] = json!({ "bool": { "filter": post_filters } });
        }
        body
    }

    /// Path-prefix completion body
    fn suggest_query(&self, request: &DocumentSearchRequest) -> Value {
        let page_size = self.paging.suggestion_page_size;
        let text = text_query(
            &request.query,
            json!({ "prefix": { PATH_FIELD: { "value": request.query } } }),
        );

        json!({
            "from": page_offset(request.page, page_size),
            "size": page_size,
            "_source": [REPO_URI_FIELD, PATH_FIELD, LANGUAGE_FIELD],
            "query": {
                "bool": {
                    "must": [text],
                    "filter": [terms(REPO_URI_FIELD, request.repo_scope.as_slice())],
                }
            }
        })
    }

    async fn run(
        &self,
        request: &DocumentSearchRequest,
        body: Value,
        page_size: usize,
        correlation_id: &CorrelationId,
    ) -> SearchResult<DocumentSearchResult> {
        if request.repo_scope.is_empty() {
            debug!(correlation_id = %correlation_id, "Empty repository scope, skipping search");
            return Ok(DocumentSearchResult {
                page: request.page,
                ..DocumentSearchResult::default()
            });
        }

        let response = execute(self.backend.as_ref(), &self.index, body, correlation_id).await?;

        let results = response
            .hits
            .hits
            .iter()
            .map(|hit| self.document_hit(hit, correlation_id))
            .collect::<SearchResult<Vec<_>>>()?;

        Ok(DocumentSearchResult {
            total: response.total(),
            took: response.took,
            page: request.page,
            total_page: total_pages(response.total(), page_size),
            results,
            repo_aggregations: facet_counts(&response, REPO_FACET),
            lang_aggregations: facet_counts(&response, LANGUAGE_FACET),
        })
    }

    fn document_hit(&self, hit: &Hit, correlation_id: &CorrelationId) -> SearchResult<DocumentHit> {
        let field = |name: &str| hit.source.get(name).and_then(Value::as_str);

        let (Some(uri), Some(file_path)) = (field(REPO_URI_FIELD), field(PATH_FIELD)) else {
            return Err(SearchError::MalformedDocument {
                index: self.index.clone(),
                message: format!("document {} lacks {REPO_URI_FIELD} or {PATH_FIELD}", hit.id),
                correlation_id: correlation_id.clone(),
            });
        };

        Ok(DocumentHit {
            uri: uri.to_string(),
            file_path: file_path.to_string(),
            language: field(LANGUAGE_FIELD).map(ToString::to_string),
            highlights: hit
                .highlight
                .as_ref()
                .and_then(|h| h.get(CONTENT_FIELD))
                .cloned()
                .unwrap_or_default(),
        })
    }
}

/// Buckets of a `terms` aggregation as facet counts
fn facet_counts(response: &EsSearchResponse, name: &str) -> Vec<FacetCount> {
    response
        .aggregation(name)
        .and_then(|agg| agg.get("buckets"))
        .and_then(Value::as_array)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    Some(FacetCount {
                        key: bucket.get("key")?.as_str()?.to_string(),
                        count: bucket.get("doc_count")?.as_u64()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl DocumentSearchClient for EsDocumentSearchClient {
    #[instrument(skip(self, request, correlation_id), fields(correlation_id = %correlation_id))]
    async fn search(
        &self,
        request: &DocumentSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<DocumentSearchResult> {
        let body = self.search_query(request);
        self.run(request, body, self.paging.page_size, correlation_id)
            .await
    }

    #[instrument(skip(self, request, correlation_id), fields(correlation_id = %correlation_id))]
    async fn suggest(
        &self,
        request: &DocumentSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<DocumentSearchResult> {
        let body = self.suggest_query(request);
        self.run(
            request,
            body,
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
    use std::collections::HashMap;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn request(langs: &[&str], repos: &[&str]) -> DocumentSearchRequest {
        DocumentSearchRequest {
            query: "render".to_string(),
            page: 1,
            lang_filters: langs.iter().map(ToString::to_string).collect(),
            repo_filters: repos.iter().map(ToString::to_string).collect(),
            repo_scope: vec!["github.com/elastic/kibana".to_string()],
        }
    }

    fn response() -> EsSearchResponse {
        let mut response = EsSearchResponse::from_sources(
            ".code-document-*",
            vec![json!({
                "repoUri": "github.com/elastic/kibana",
                "path": "src/app.tsx",
                "language": "typescript"
            })],
        )
        .with_aggregations(json!({
            "repoUri": { "buckets": [ { "key": "github.com/elastic/kibana", "doc_count": 12 } ] },
            "language": { "buckets": [
                { "key": "typescript", "doc_count": 10 },
                { "key": "javascript", "doc_count": 2 }
            ] }
        }));
        if let Some(hit) = response.hits.hits.first_mut() {
            hit.highlight = Some(HashMap::from([(
                "content".to_string(),
                vec!["<em>render</em>()".to_string()],
            )]));
        }
        response
    }

    #[tokio::test]
    async fn test_search_returns_hits_and_facets() -> TestResult {
        let backend = Arc::new(MockSearchBackend::new().with_response(response()));
        let client =
            EsDocumentSearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-document-*", Paging::default());

        let result = client.search(&request(&[], &[]), &CorrelationId::new()).await?;

        assert_eq!(result.total, 1);
        assert_eq!(result.results[0].file_path, "src/app.tsx");
        assert_eq!(result.results[0].highlights, vec!["<em>render</em>()".to_string()]);
        assert_eq!(result.lang_aggregations.len(), 2);
        assert_eq!(
            result.repo_aggregations,
            vec![FacetCount { key: "github.com/elastic/kibana".to_string(), count: 12 }]
        );

        let body = backend.last_body().ok_or("no request")?;
        assert!(body.get("post_filter").is_none());
        assert!(body["aggs"].get("language").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_filters_go_to_post_filter() -> TestResult {
        let backend = Arc::new(MockSearchBackend::new());
        let client =
            EsDocumentSearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-document-*", Paging::default());

        client
            .search(&request(&["rust"], &["a", "b"]), &CorrelationId::new())
            .await?;

        let body = backend.last_body().ok_or("no request")?;
        assert_eq!(
            body["post_filter"]["bool"]["filter"],
            json!([
                { "terms": { "language": ["rust"] } },
                { "terms": { "repoUri": ["a", "b"] } }
            ])
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_suggest_is_path_prefix_without_facets() -> TestResult {
        let backend = Arc::new(MockSearchBackend::new());
        let client =
            EsDocumentSearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-document-*", Paging::default());

        client.suggest(&request(&[], &[]), &CorrelationId::new()).await?;

        let body = backend.last_body().ok_or("no request")?;
        assert_eq!(
            body["query"]["bool"]["must"][0],
            json!({ "prefix": { "path": { "value": "render" } } })
        );
        assert!(body.get("aggs").is_none());
        assert_eq!(body["size"], 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_hit_without_path_is_malformed() {
        let backend = Arc::new(MockSearchBackend::new().with_response(
            EsSearchResponse::from_sources(".code-document-*", vec![json!({ "repoUri": "a" })]),
        ));
        let client = EsDocumentSearchClient::new(backend, ".code-document-*", Paging::default());

        let result = client.search(&request(&[], &[]), &CorrelationId::new()).await;
        assert!(matches!(result, Err(SearchError::MalformedDocument { .. })));
    }
}
