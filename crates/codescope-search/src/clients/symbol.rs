use super::{Paging, REPO_URI_FIELD, execute, text_query};
use crate::model::{SymbolHit, SymbolSearchRequest, SymbolSearchResult};
use crate::{SearchError, SearchResult};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_es::query::{page_offset, terms, total_pages};
use codescope_es::{Hit, SearchBackend};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

const QNAME_FIELD: &str = "qname";
const SYMBOL_NAME_FIELD: &str = "symbolInformation.name";

/// Symbol lookup; only suggestions exist, full search routes reuse them
#[async_trait]
pub trait SymbolSearchClient: Send + Sync {
    async fn suggest(
        &self,
        request: &SymbolSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<SymbolSearchResult>;
}

pub struct EsSymbolSearchClient {
    backend: Arc<dyn SearchBackend>,
    index: String,
    paging: Paging,
}

impl EsSymbolSearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>, paging: Paging) -> Self {
        Self {
            backend,
            index: index.into(),
            paging,
        }
    }

    fn suggest_query(&self, request: &SymbolSearchRequest) -> Value {
        let page_size = self.paging.suggestion_page_size;
        let text = text_query(
            &request.query,
            json!({
                "bool": {
                    "should": [
                        { "prefix": { QNAME_FIELD: { "value": request.query } } },
                        { "match": { SYMBOL_NAME_FIELD: request.query } }
                    ],
                    "minimum_should_match": 1
                }
            }),
        );

        json!({
            "from": page_offset(request.page, page_size),
            "size": page_size,
            "query": {
                "bool": {
                    "must": [text],
                    "filter": [terms(REPO_URI_FIELD, request.repo_scope.as_slice())],
                }
            }
        })
    }

    fn symbol_hit(&self, hit: &Hit, correlation_id: &CorrelationId) -> SearchResult<SymbolHit> {
        let source = &hit.source;
        let qname = source
            .get(QNAME_FIELD)
            .and_then(Value::as_str)
            .or_else(|| source.pointer("/symbolInformation/name").and_then(Value::as_str));

        let (Some(qname), Some(repo_uri)) =
            (qname, source.get(REPO_URI_FIELD).and_then(Value::as_str))
        else {
            return Err(SearchError::MalformedDocument {
                index: self.index.clone(),
                message: format!("symbol {} lacks {QNAME_FIELD} or {REPO_URI_FIELD}", hit.id),
                correlation_id: correlation_id.clone(),
            });
        };

        // LSP symbol kinds are numeric; some indexers store names instead
        let kind = source
            .pointer("/symbolInformation/kind")
            .and_then(|kind| match kind {
                Value::String(name) => Some(name.clone()),
                Value::Number(code) => Some(code.to_string()),
                _ => None,
            });

        Ok(SymbolHit {
            qname: qname.to_string(),
            kind,
            repo_uri: repo_uri.to_string(),
            file_path: source
                .pointer("/symbolInformation/location/uri")
                .and_then(Value::as_str)
                .map(ToString::to_string),
        })
    }
}

#[async_trait]
impl SymbolSearchClient for EsSymbolSearchClient {
    #[instrument(skip(self, request, correlation_id), fields(correlation_id = %correlation_id))]
    async fn suggest(
        &self,
        request: &SymbolSearchRequest,
        correlation_id: &CorrelationId,
    ) -> SearchResult<SymbolSearchResult> {
        if request.repo_scope.is_empty() {
            debug!(correlation_id = %correlation_id, "Empty repository scope, skipping search");
            return Ok(SymbolSearchResult {
                page: request.page,
                ..SymbolSearchResult::default()
            });
        }

        let page_size = self.paging.suggestion_page_size;
        let body = self.suggest_query(request);
        let response = execute(self.backend.as_ref(), &self.index, body, correlation_id).await?;

        let symbols = response
            .hits
            .hits
            .iter()
            .map(|hit| self.symbol_hit(hit, correlation_id))
            .collect::<SearchResult<Vec<_>>>()?;

        Ok(SymbolSearchResult {
            total: response.total(),
            took: response.took,
            page: request.page,
            total_page: total_pages(response.total(), page_size),
            symbols,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_es::{EsSearchResponse, MockSearchBackend};

    #[tokio::test]
    async fn test_suggest_parses_symbols() -> Result<(), Box<dyn std::error::Error>> {
        let backend = Arc::new(MockSearchBackend::new().with_response(
            EsSearchResponse::from_sources(
                ".code-symbol-*",
                vec![
                    json!({
                        "qname": "app.render",
                        "repoUri": "github.com/elastic/kibana",
                        "symbolInformation": {
                            "name": "render",
                            "kind": 12,
                            "location": { "uri": "src/app.tsx" }
                        }
                    }),
                    json!({
                        "repoUri": "github.com/elastic/kibana",
                        "symbolInformation": { "name": "mount", "kind": "Function" }
                    }),
                ],
            ),
        ));
        let client =
            EsSymbolSearchClient::new(Arc::<MockSearchBackend>::clone(&backend), ".code-symbol-*", Paging::default());
        let request = SymbolSearchRequest {
            query: "ren".to_string(),
            page: 2,
            repo_scope: vec!["github.com/elastic/kibana".to_string()],
        };

        let result = client.suggest(&request, &CorrelationId::new()).await?;

        assert_eq!(result.symbols.len(), 2);
        assert_eq!(result.symbols[0].qname, "app.render");
        assert_eq!(result.symbols[0].kind.as_deref(), Some("12"));
        assert_eq!(result.symbols[0].file_path.as_deref(), Some("src/app.tsx"));
        assert_eq!(result.symbols[1].qname, "mount");
        assert_eq!(result.symbols[1].kind.as_deref(), Some("Function"));

        let body = backend.last_body().ok_or("no request")?;
        assert_eq!(body["from"], 10);
        assert_eq!(
            body["query"]["bool"]["must"][0]["bool"]["should"][0],
            json!({ "prefix": { "qname": { "value": "ren" } } })
        );
        Ok(())
    }
}
