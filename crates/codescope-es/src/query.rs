//! Small query DSL helpers shared by the search and APM builders

use serde_json::{Value, json};

/// `{ "term": { field: value } }`
pub fn term(field: &str, value: impl Into<Value>) -> Value {
    json!({ "term": { field: value.into() } })
}

/// `{ "terms": { field: [values...] } }`
pub fn terms<S: AsRef<str>>(field: &str, values: &[S]) -> Value {
    let values: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
    json!({ "terms": { field: values } })
}

/// Offset of the first hit on a 1-based `page`
///
/// Page 0 is treated as page 1.
pub const fn page_offset(page: usize, page_size: usize) -> usize {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// Number of pages needed to show `total` hits
pub const fn total_pages(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}
