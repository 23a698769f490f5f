//! Codescope search crate
//!
//! Typed search requests and results, repository scope resolution, and the
//! Elasticsearch-backed clients for repository, document, symbol, commit and
//! snippet search.

pub mod clients;
pub mod error;
pub mod model;
pub mod scope;

// Re-export main types
pub use clients::{
    CommitSearchClient, DocumentSearchClient, EsCommitSearchClient, EsDocumentSearchClient,
    EsIntegrationsSearchClient, EsRepositorySearchClient, EsSymbolSearchClient, IndexNames,
    IntegrationsSearchClient, Paging, RepositorySearchClient, SymbolSearchClient,
};
pub use error::{SearchError, SearchResult};
pub use scope::{
    EsReferenceLookup, ReferenceLookup, RepoScope, ScopeResolver, StaticReferenceLookup,
    resolve_scope,
};

// Re-export test utilities when test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks {
    pub use crate::clients::test_utils::{MockSearchClient, RecordedCall};
}
