//! Unit test utilities
//!
//! Provides mock state for fast unit tests that don't require infrastructure.

use crate::AppState;
use crate::state::SearchClients;
use codescope_apm::DistributionFetcher;
use codescope_config::ApmConfig;
use codescope_es::{MockSearchBackend, SearchBackend};
use codescope_search::test_mocks::MockSearchClient;
use codescope_search::{ScopeResolver, StaticReferenceLookup};
use std::sync::Arc;
use std::time::Duration;

/// Standard test result type for all test functions
pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Repositories the mock reference lookup permits
pub fn permitted() -> Vec<String> {
    vec![
        "github.com/elastic/kibana".to_string(),
        "github.com/elastic/elasticsearch".to_string(),
    ]
}

/// `AppState` over mock clients and an empty mock backend
#[must_use]
pub fn mock_state(clients: MockSearchClient, permitted: Vec<String>) -> AppState {
    mock_state_with_backend(clients, permitted, MockSearchBackend::new())
}

/// `AppState` whose APM fetcher and health check use `backend`
#[must_use]
pub fn mock_state_with_backend(
    clients: MockSearchClient,
    permitted: Vec<String>,
    backend: MockSearchBackend,
) -> AppState {
    let shared = Arc::new(clients);
    let backend = Arc::new(backend) as Arc<dyn SearchBackend>;

    AppState::new(
        SearchClients {
            repository: Arc::clone(&shared) as _,
            document: Arc::clone(&shared) as _,
            symbol: Arc::clone(&shared) as _,
            commit: Arc::clone(&shared) as _,
            integrations: shared,
        },
        ScopeResolver::new(Arc::new(StaticReferenceLookup::new(permitted))),
        Arc::new(DistributionFetcher::new(
            Arc::clone(&backend),
            &ApmConfig::default(),
        )),
        backend,
        Duration::from_secs(30),
        Duration::from_secs(60),
    )
}
