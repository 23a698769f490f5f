//! Reusable filter clauses

use crate::fields::TIMESTAMP;
use serde_json::{Value, json};

/// `@timestamp` range between two epoch-millisecond instants, inclusive
pub fn range_filter(start: i64, end: i64) -> Value {
    json!({
        TIMESTAMP: {
            "gte": start,
            "lte": end,
            "format": "epoch_millis"
        }
    })
}

/// A saved-query phrase filter record for `key == value`
///
/// Wire-model export for clients that persist UI filters. The distribution
/// query itself only needs [`phrase_filter_clause`].
pub fn phrase_filter(key: &str, value: &str) -> Value {
    json!({
        "meta": {
            "alias": null,
            "negate": false,
            "disabled": false,
            "type": "phrase",
            "key": key,
            "value": value,
            "params": { "query": value }
        },
        "query": phrase_filter_clause(key, value)
    })
}

/// Query part of [`phrase_filter`], usable as a bool filter clause
pub fn phrase_filter_clause(key: &str, value: &str) -> Value {
    json!({
        "match": {
            key: { "query": value, "type": "phrase" }
        }
    })
}
