//! Request and result records exchanged with the search clients

pub mod commit;
pub mod request;
pub mod result;

pub use commit::{CommitInfo, ReferenceInfo, ReferenceType};
pub use request::{
    CommitSearchRequest, DocumentSearchRequest, RepositorySearchRequest, ResolveSnippetsRequest,
    SearchRequest, StackTraceItem, StackTraceSnippetsRequest, SymbolSearchRequest,
};
pub use result::{
    CommitSearchResult, DocumentHit, DocumentSearchResult, FacetCount, RepositoryHit,
    RepositorySearchResult, SnippetSearchResult, SymbolHit, SymbolSearchResult,
};
