//! Version-control view records
//!
//! [`ReferenceInfo`] and [`ReferenceType`] describe reference documents for
//! API consumers and the published schema. No route returns them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A commit as stored in the commit index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub updated: DateTime<Utc>,
    pub message: String,
    pub committer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer_email: Option<String>,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    pub id: String,
    #[serde(default)]
    pub parents: Vec<String>,
    pub tree_id: String,
}

/// Kind of a named reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    Branch,
    Tag,
    RemoteBranch,
    Other,
}

/// A branch, tag or other named reference, optionally resolved to its commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceInfo {
    pub name: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
    #[serde(rename = "type")]
    pub ref_type: ReferenceType,
}
