//! Application bootstrap and service initialization
//!
//! Builds the Elasticsearch backend, the reference lookup and every search
//! client from configuration, and wires them into [`AppState`].

use codescope_apm::DistributionFetcher;
use codescope_config::ApplicationConfig;
use codescope_es::{HttpSearchBackend, SearchBackend};
use codescope_search::{
    EsCommitSearchClient, EsDocumentSearchClient, EsIntegrationsSearchClient,
    EsReferenceLookup, EsRepositorySearchClient, EsSymbolSearchClient, IndexNames, Paging,
    ReferenceLookup, ScopeResolver, StaticReferenceLookup,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::AppState;
use crate::state::SearchClients;

/// Bootstrap result type
pub type BootstrapResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Initialize the Elasticsearch backend
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn setup_backend(config: &ApplicationConfig) -> BootstrapResult<Arc<dyn SearchBackend>> {
    info!(
        url = %config.elasticsearch.safe_connection_string(),
        "Initializing Elasticsearch backend..."
    );
    let backend = Arc::new(HttpSearchBackend::new(&config.elasticsearch)?) as Arc<dyn SearchBackend>;
    Ok(backend)
}

/// Choose where the permitted repository set comes from
///
/// A configured list wins; otherwise the references index is read per request.
pub fn setup_reference_lookup(
    config: &ApplicationConfig,
    backend: &Arc<dyn SearchBackend>,
) -> Arc<dyn ReferenceLookup> {
    match &config.search.permitted_repositories {
        Some(uris) => {
            info!(count = uris.len(), "Using configured permitted repositories");
            Arc::new(StaticReferenceLookup::new(uris.iter().cloned())) as Arc<dyn ReferenceLookup>
        }
        None => {
            info!(
                index = %config.elasticsearch.reference_index,
                "Reading permitted repositories from the references index"
            );
            Arc::new(EsReferenceLookup::new(
                Arc::clone(backend),
                config.elasticsearch.reference_index.clone(),
                config.elasticsearch.max_references,
            )) as Arc<dyn ReferenceLookup>
        }
    }
}

/// Elasticsearch clients for every search kind
pub fn setup_search_clients(
    config: &ApplicationConfig,
    backend: &Arc<dyn SearchBackend>,
) -> SearchClients {
    let indices = IndexNames::from_config(&config.elasticsearch);
    let paging = Paging::from_config(&config.search);

    SearchClients {
        repository: Arc::new(EsRepositorySearchClient::new(
            Arc::clone(backend),
            indices.repository,
            paging,
        )),
        document: Arc::new(EsDocumentSearchClient::new(
            Arc::clone(backend),
            indices.document.clone(),
            paging,
        )),
        symbol: Arc::new(EsSymbolSearchClient::new(
            Arc::clone(backend),
            indices.symbol,
            paging,
        )),
        commit: Arc::new(EsCommitSearchClient::new(
            Arc::clone(backend),
            indices.commit,
            paging,
        )),
        integrations: Arc::new(EsIntegrationsSearchClient::new(
            Arc::clone(backend),
            indices.document,
        )),
    }
}

/// Wire a backend and reference lookup into application state
pub fn build_app_state(
    config: &ApplicationConfig,
    backend: Arc<dyn SearchBackend>,
    lookup: Arc<dyn ReferenceLookup>,
) -> AppState {
    let clients = setup_search_clients(config, &backend);
    let distribution = Arc::new(DistributionFetcher::new(Arc::clone(&backend), &config.apm));

    AppState::new(
        clients,
        ScopeResolver::new(lookup),
        distribution,
        backend,
        Duration::from_secs(config.elasticsearch.timeout_seconds),
        Duration::from_secs(config.api.timeout_seconds),
    )
}

/// Initialize all services and create application state
///
/// # Errors
///
/// Returns error if any service initialization fails
pub fn initialize_app_state(config: &ApplicationConfig) -> BootstrapResult<AppState> {
    let backend = setup_backend(config)?;
    let lookup = setup_reference_lookup(config, &backend);
    let state = build_app_state(config, backend, lookup);

    info!("Application state initialized successfully");
    Ok(state)
}
