//! Typed search requests
//!
//! Pages are 1-based. Wire names follow the code-search HTTP API
//! (`repoUris`, `filePath`, `lineNumStart`, ...).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const fn default_page() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySearchRequest {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub repo_scope: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSearchRequest {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub lang_filters: Vec<String>,
    #[serde(default)]
    pub repo_filters: Vec<String>,
    #[serde(default)]
    pub repo_scope: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSearchRequest {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub repo_scope: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSearchRequest {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub repo_filters: Vec<String>,
    #[serde(default)]
    pub repo_scope: Vec<String>,
}

/// Resolve one source snippet from a stack-trace location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSnippetsRequest {
    pub repo_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub file_path: String,
    pub line_num_start: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_num_end: Option<usize>,
}

/// One frame of an APM stack trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceItem {
    pub file_path: String,
    pub line_num_start: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_num_end: Option<usize>,
}

/// A batch of stack-trace frames sharing candidate repositories and revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceSnippetsRequest {
    #[serde(default)]
    pub repo_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default)]
    pub stacktrace_items: Vec<StackTraceItem>,
}

impl StackTraceSnippetsRequest {
    /// One resolve request per stack-trace item, over the given repositories
    pub fn resolve_requests(&self, repo_uris: &[String]) -> Vec<ResolveSnippetsRequest> {
        self.stacktrace_items
            .iter()
            .map(|item| ResolveSnippetsRequest {
                repo_uris: repo_uris.to_vec(),
                revision: self.revision.clone(),
                file_path: item.file_path.clone(),
                line_num_start: item.line_num_start,
                line_num_end: item.line_num_end,
            })
            .collect()
    }
}

/// Any request a search client can receive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchRequest {
    Repository(RepositorySearchRequest),
    Document(DocumentSearchRequest),
    Symbol(SymbolSearchRequest),
    Commit(CommitSearchRequest),
    ResolveSnippets(ResolveSnippetsRequest),
}

impl SearchRequest {
    /// Repository scope carried by the request (candidate URIs for snippets)
    pub fn repo_scope(&self) -> &[String] {
        match self {
            Self::Repository(r) => &r.repo_scope,
            Self::Document(r) => &r.repo_scope,
            Self::Symbol(r) => &r.repo_scope,
            Self::Commit(r) => &r.repo_scope,
            Self::ResolveSnippets(r) => &r.repo_uris,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_defaults_to_one() -> Result<(), Box<dyn std::error::Error>> {
        let request: SymbolSearchRequest = serde_json::from_value(json!({ "query": "main" }))?;
        assert_eq!(request.page, 1);
        assert!(request.repo_scope.is_empty());
        Ok(())
    }

    #[test]
    fn test_stacktrace_request_wire_format() -> Result<(), Box<dyn std::error::Error>> {
        let request: StackTraceSnippetsRequest = serde_json::from_value(json!({
            "repoUris": ["github.com/elastic/kibana"],
            "revision": "v7.3.0",
            "stacktraceItems": [
                { "filePath": "src/a.ts", "lineNumStart": 10 },
                { "filePath": "src/b.ts", "lineNumStart": 3, "lineNumEnd": 8 }
            ]
        }))?;

        let resolved = request.resolve_requests(&request.repo_uris);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].line_num_end, None);
        assert_eq!(resolved[1].line_num_end, Some(8));
        assert_eq!(resolved[1].revision.as_deref(), Some("v7.3.0"));
        Ok(())
    }

    #[test]
    fn test_tagged_request_exposes_scope() {
        let request = SearchRequest::Commit(CommitSearchRequest {
            query: "fix".to_string(),
            page: 2,
            repo_filters: vec![],
            repo_scope: vec!["a".to_string()],
        });
        assert_eq!(request.repo_scope(), ["a".to_string()]);
    }
}
