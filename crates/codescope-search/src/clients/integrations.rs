use super::{REPO_URI_FIELD, execute};
use crate::model::{ResolveSnippetsRequest, SnippetSearchResult};
use crate::{SearchError, SearchResult};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_es::SearchBackend;
use codescope_es::query::{term, terms};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

const PATH_FIELD: &str = "path";

/// Resolves stack-trace locations to source snippets
#[async_trait]
pub trait IntegrationsSearchClient: Send + Sync {
    async fn resolve_snippets(
        &self,
        request: &ResolveSnippetsRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<SnippetSearchResult>>;
}

pub struct EsIntegrationsSearchClient {
    backend: Arc<dyn SearchBackend>,
    index: String,
}

impl EsIntegrationsSearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>) -> Self {
        Self {
            backend,
            index: index.into(),
        }
    }
}

#[async_trait]
impl IntegrationsSearchClient for EsIntegrationsSearchClient {
    #[instrument(skip(self, request, correlation_id), fields(correlation_id = %correlation_id))]
    async fn resolve_snippets(
        &self,
        request: &ResolveSnippetsRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<SnippetSearchResult>> {
        if request.repo_uris.is_empty() {
            debug!(correlation_id = %correlation_id, file_path = %request.file_path, "No candidate repositories");
            return Ok(Vec::new());
        }

        let body = json!({
            "size": 1,
            "query": {
                "bool": {
                    "filter": [
                        term(PATH_FIELD, request.file_path.as_str()),
                        terms(REPO_URI_FIELD, request.repo_uris.as_slice()),
                    ]
                }
            }
        });

        let response = execute(self.backend.as_ref(), &self.index, body, correlation_id).await?;

        response
            .hits
            .hits
            .iter()
            .map(|hit| {
                let field = |name: &str| hit.source.get(name).and_then(Value::as_str);
                let (Some(uri), Some(content)) = (field(REPO_URI_FIELD), field("content")) else {
                    return Err(SearchError::MalformedDocument {
                        index: self.index.clone(),
                        message: format!("document {} lacks {REPO_URI_FIELD} or content", hit.id),
                        correlation_id: correlation_id.clone(),
                    });
                };

                let (start, end, lines) =
                    slice_lines(content, request.line_num_start, request.line_num_end);
                Ok(SnippetSearchResult {
                    uri: uri.to_string(),
                    file_path: field(PATH_FIELD).unwrap_or(request.file_path.as_str()).to_string(),
                    language: field("language").map(ToString::to_string),
                    revision: request.revision.clone(),
                    line_num_start: start,
                    line_num_end: end,
                    content: lines,
                })
            })
            .collect()
    }
}

/// Lines `start..=end` (1-based) of `content`, clamped to the file
///
/// A missing `end` selects the single line `start`. Returns the clamped
/// bounds with the selected text.
pub fn slice_lines(content: &str, start: usize, end: Option<usize>) -> (usize, usize, String) {
    let total = content.lines().count();
    if total == 0 {
        let start = start.max(1);
        return (start, start, String::new());
    }

    let start = start.clamp(1, total);
    let end = end.unwrap_or(start).clamp(start, total);
    let text = content
        .lines()
        .skip(start.saturating_sub(1))
        .take(end.saturating_sub(start).saturating_add(1))
        .collect::<Vec<_>>()
        .join("\n");
    (start, end, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_es::{EsSearchResponse, MockSearchBackend};

    const FILE: &str = "line 1\nline 2\nline 3\nline 4\nline 5";

    #[test]
    fn test_slice_single_line_when_end_missing() {
        assert_eq!(slice_lines(FILE, 2, None), (2, 2, "line 2".to_string()));
    }

    #[test]
    fn test_slice_range_is_inclusive() {
        assert_eq!(
            slice_lines(FILE, 2, Some(4)),
            (2, 4, "line 2\nline 3\nline 4".to_string())
        );
    }

    #[test]
    fn test_slice_clamps_out_of_range() {
        assert_eq!(slice_lines(FILE, 0, Some(1)), (1, 1, "line 1".to_string()));
        assert_eq!(slice_lines(FILE, 4, Some(99)), (4, 5, "line 4\nline 5".to_string()));
        assert_eq!(slice_lines(FILE, 42, None), (5, 5, "line 5".to_string()));
        assert_eq!(slice_lines(FILE, 3, Some(1)), (3, 3, "line 3".to_string()));
        assert_eq!(slice_lines("", 3, None), (3, 3, String::new()));
    }

    #[tokio::test]
    async fn test_resolve_snippets_queries_path_in_candidate_repos()
    -> Result<(), Box<dyn std::error::Error>> {
        let backend = Arc::new(MockSearchBackend::new().with_response(
            EsSearchResponse::from_sources(
                ".code-document-*",
                vec![json!({
                    "repoUri": "github.com/elastic/kibana",
                    "path": "src/a.ts",
                    "language": "typescript",
                    "content": FILE
                })],
            ),
        ));
        let client = EsIntegrationsSearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-document-*");
        let request = ResolveSnippetsRequest {
            repo_uris: vec!["github.com/elastic/kibana".to_string()],
            revision: Some("main".to_string()),
            file_path: "src/a.ts".to_string(),
            line_num_start: 3,
            line_num_end: Some(4),
        };

        let snippets = client.resolve_snippets(&request, &CorrelationId::new()).await?;

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].content, "line 3\nline 4");
        assert_eq!(snippets[0].revision.as_deref(), Some("main"));
        assert_eq!(snippets[0].language.as_deref(), Some("typescript"));

        let body = backend.last_body().ok_or("no request")?;
        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([
                { "term": { "path": "src/a.ts" } },
                { "terms": { "repoUri": ["github.com/elastic/kibana"] } }
            ])
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_no_candidate_repos_skips_backend() -> Result<(), Box<dyn std::error::Error>> {
        let backend = Arc::new(MockSearchBackend::new());
        let client = EsIntegrationsSearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-document-*");
        let request = ResolveSnippetsRequest {
            repo_uris: vec![],
            revision: None,
            file_path: "src/a.ts".to_string(),
            line_num_start: 1,
            line_num_end: None,
        };

        assert!(client.resolve_snippets(&request, &CorrelationId::new()).await?.is_empty());
        assert_eq!(backend.request_count(), 0);
        Ok(())
    }
}
