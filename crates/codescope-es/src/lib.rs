//! Elasticsearch access for codescope
//!
//! A single [`SearchBackend`] seam sits between the search/APM crates and the
//! cluster. [`HttpSearchBackend`] talks to Elasticsearch's `_search` endpoint
//! over `reqwest`; the mock backend (feature `test-utils`) records requests and
//! replays canned responses.

pub mod backend;
pub mod error;
pub mod query;
pub mod response;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use backend::{HttpSearchBackend, SearchBackend};
pub use error::{EsError, EsResult};
pub use response::{EsSearchResponse, Hit, Hits, TotalHits};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockSearchBackend, RecordedSearch};
