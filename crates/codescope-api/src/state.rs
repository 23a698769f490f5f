//! Application state for Axum handlers
//!
//! Built once at startup and cloned into every handler. Everything inside is
//! an `Arc`, so cloning is cheap and nothing is mutated after startup.

use codescope_apm::DistributionFetcher;
use codescope_es::SearchBackend;
use codescope_search::{
    CommitSearchClient, DocumentSearchClient, IntegrationsSearchClient, RepositorySearchClient,
    ScopeResolver, SymbolSearchClient,
};
use std::sync::Arc;
use std::time::Duration;

/// Search clients, one per search kind
#[derive(Clone)]
pub struct SearchClients {
    pub repository: Arc<dyn RepositorySearchClient>,
    pub document: Arc<dyn DocumentSearchClient>,
    pub symbol: Arc<dyn SymbolSearchClient>,
    pub commit: Arc<dyn CommitSearchClient>,
    pub integrations: Arc<dyn IntegrationsSearchClient>,
}

/// Application state containing all shared services
#[derive(Clone)]
pub struct AppState {
    pub clients: SearchClients,
    /// Narrows requests to the repositories a caller may see
    pub scope_resolver: ScopeResolver,
    /// APM transaction distribution
    pub distribution: Arc<DistributionFetcher>,
    /// Raw backend, used for health checks
    pub backend: Arc<dyn SearchBackend>,
    /// Reported when the backend is unreachable
    pub backend_timeout: Duration,
    /// Budget for a whole request
    pub request_timeout: Duration,
}

impl AppState {
    #[must_use]
    pub const fn new(
        clients: SearchClients,
        scope_resolver: ScopeResolver,
        distribution: Arc<DistributionFetcher>,
        backend: Arc<dyn SearchBackend>,
        backend_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            clients,
            scope_resolver,
            distribution,
            backend,
            backend_timeout,
            request_timeout,
        }
    }
}
