//! Search result records returned to HTTP callers

use crate::model::CommitInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A repository hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryHit {
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySearchResult {
    pub total: u64,
    pub took: u64,
    pub page: usize,
    pub total_page: u64,
    pub repositories: Vec<RepositoryHit>,
}

/// A source file hit, with highlighted fragments of its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHit {
    pub uri: String,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Document count for one facet value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FacetCount {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSearchResult {
    pub total: u64,
    pub took: u64,
    pub page: usize,
    pub total_page: u64,
    pub results: Vec<DocumentHit>,
    pub repo_aggregations: Vec<FacetCount>,
    pub lang_aggregations: Vec<FacetCount>,
}

/// A symbol definition hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymbolHit {
    pub qname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub repo_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSearchResult {
    pub total: u64,
    pub took: u64,
    pub page: usize,
    pub total_page: u64,
    pub symbols: Vec<SymbolHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitSearchResult {
    pub total: u64,
    pub took: u64,
    pub page: usize,
    pub total_page: u64,
    pub commits: Vec<CommitInfo>,
}

/// Lines of one file resolved for a stack-trace frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSearchResult {
    pub uri: String,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub line_num_start: usize,
    pub line_num_end: usize,
    pub content: String,
}
