//! Typed view of an Elasticsearch `_search` response

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Total hit count, accepting both the legacy number and the
/// `{ "value": n, "relation": "eq" }` object forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64, relation: String },
}

impl TotalHits {
    pub const fn value(&self) -> u64 {
        match self {
            Self::Count(value) | Self::Object { value, .. } => *value,
        }
    }
}

impl Default for TotalHits {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HashMap<String, Vec<String>>>,
}

/// The `hits` envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: TotalHits,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Response of `POST /{index}/_search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsSearchResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub hits: Hits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

impl EsSearchResponse {
    /// A response with no hits
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a response whose hits carry the given `_source` documents
    ///
    /// Document ids are the hit positions, total equals the number of sources.
    pub fn from_sources(index: &str, sources: Vec<Value>) -> Self {
        let hits: Vec<Hit> = sources
            .into_iter()
            .enumerate()
            .map(|(i, source)| Hit {
                index: index.to_string(),
                id: i.to_string(),
                score: Some(1.0),
                source,
                highlight: None,
            })
            .collect();

        Self {
            took: 1,
            timed_out: false,
            hits: Hits {
                total: TotalHits::Count(hits.len() as u64),
                hits,
            },
            aggregations: None,
        }
    }

    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.hits.total = TotalHits::Count(total);
        self
    }

    #[must_use]
    pub fn with_aggregations(mut self, aggregations: Value) -> Self {
        self.aggregations = Some(aggregations);
        self
    }

    /// Total number of matching documents
    pub const fn total(&self) -> u64 {
        self.hits.total.value()
    }

    /// Look up an aggregation by name
    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.aggregations.as_ref().and_then(|aggs| aggs.get(name))
    }
}
