//! Code search routes
//!
//! Every handler resolves the caller's repository scope, builds a typed
//! request and hands it to the matching search client. Any failure, whether
//! in scope resolution or in the client, becomes the same
//! "Search Exception" error.
//!
//! `search/symbol` and `suggestions/symbol` share one handler.

use crate::middleware::RequestContext;
use crate::routes::params::SearchParams;
use crate::routes::request_correlation_id;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    Json, Router,
    extract::{Extension, Query, State},
    routing::get,
};
use codescope_common::CorrelationId;
use codescope_search::model::{
    CommitSearchRequest, CommitSearchResult, DocumentSearchRequest, DocumentSearchResult,
    RepositorySearchRequest, RepositorySearchResult, SymbolSearchRequest, SymbolSearchResult,
};
use tracing::{info, instrument};

/// Raw query-string pairs; `repoScope` may repeat
type QueryPairs = Query<Vec<(String, String)>>;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/code/search/repo", get(repo_search_handler))
        .route("/api/code/suggestions/repo", get(repo_suggest_handler))
        .route("/api/code/search/doc", get(doc_search_handler))
        .route("/api/code/suggestions/doc", get(doc_suggest_handler))
        .route("/api/code/search/symbol", get(symbol_search_handler))
        .route("/api/code/suggestions/symbol", get(symbol_search_handler))
        .route("/api/code/search/commit", get(commit_search_handler))
        .with_state(state)
}

/// Parse parameters and resolve the caller's scope
async fn prepare(
    state: &AppState,
    pairs: &[(String, String)],
    operation: &str,
    correlation_id: &CorrelationId,
) -> ApiResult<(SearchParams, Vec<String>)> {
    let params = SearchParams::from_pairs(pairs);
    let scope = state
        .scope_resolver
        .resolve(&params.repo_scope, correlation_id)
        .await
        .map_err(|e| ApiError::search_exception(e, operation, correlation_id))?;

    info!(
        correlation_id = %correlation_id,
        operation,
        query = %params.query,
        page = params.page,
        scope = scope.len(),
        "Code search request"
    );
    Ok((params, scope))
}

#[utoipa::path(
    get,
    path = "/api/code/search/repo",
    tag = "code",
    params(
        ("q" = Option<String>, Query, description = "Free-text query"),
        ("p" = Option<String>, Query, description = "1-based page"),
        ("repoScope" = Option<String>, Query, description = "Comma-separated repository URIs; may repeat"),
    ),
    responses(
        (status = 200, description = "Repository hits", body = RepositorySearchResult),
        (status = 500, description = "Search Exception", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, pairs), fields(correlation_id))]
pub async fn repo_search_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<RepositorySearchResult>> {
    let correlation_id = request_correlation_id(context.as_ref());
    let (params, repo_scope) = prepare(&state, &pairs, "repository search", &correlation_id).await?;

    let request = RepositorySearchRequest {
        query: params.query,
        page: params.page,
        repo_scope,
    };
    state
        .clients
        .repository
        .search(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::search_exception(e, "repository search", &correlation_id))
}

#[utoipa::path(
    get,
    path = "/api/code/suggestions/repo",
    tag = "code",
    params(
        ("q" = Option<String>, Query, description = "Repository name prefix"),
        ("p" = Option<String>, Query, description = "1-based page"),
        ("repoScope" = Option<String>, Query, description = "Comma-separated repository URIs; may repeat"),
    ),
    responses(
        (status = 200, description = "Repository suggestions", body = RepositorySearchResult),
        (status = 500, description = "Search Exception", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, pairs), fields(correlation_id))]
pub async fn repo_suggest_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<RepositorySearchResult>> {
    let correlation_id = request_correlation_id(context.as_ref());
    let (params, repo_scope) =
        prepare(&state, &pairs, "repository suggestion", &correlation_id).await?;

    let request = RepositorySearchRequest {
        query: params.query,
        page: params.page,
        repo_scope,
    };
    state
        .clients
        .repository
        .suggest(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::search_exception(e, "repository suggestion", &correlation_id))
}

#[utoipa::path(
    get,
    path = "/api/code/search/doc",
    tag = "code",
    params(
        ("q" = Option<String>, Query, description = "Free-text query"),
        ("p" = Option<String>, Query, description = "1-based page"),
        ("langs" = Option<String>, Query, description = "Comma-separated languages"),
        ("repos" = Option<String>, Query, description = "Comma-separated repository URIs, URL-encoded"),
        ("repoScope" = Option<String>, Query, description = "Comma-separated repository URIs; may repeat"),
    ),
    responses(
        (status = 200, description = "Document hits with facets", body = DocumentSearchResult),
        (status = 500, description = "Search Exception", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, pairs), fields(correlation_id))]
pub async fn doc_search_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<DocumentSearchResult>> {
    let correlation_id = request_correlation_id(context.as_ref());
    let (params, repo_scope) = prepare(&state, &pairs, "document search", &correlation_id).await?;

    let request = DocumentSearchRequest {
        query: params.query,
        page: params.page,
        lang_filters: params.langs,
        repo_filters: params.repos,
        repo_scope,
    };
    state
        .clients
        .document
        .search(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::search_exception(e, "document search", &correlation_id))
}

#[utoipa::path(
    get,
    path = "/api/code/suggestions/doc",
    tag = "code",
    params(
        ("q" = Option<String>, Query, description = "File path prefix"),
        ("p" = Option<String>, Query, description = "1-based page"),
        ("repoScope" = Option<String>, Query, description = "Comma-separated repository URIs; may repeat"),
    ),
    responses(
        (status = 200, description = "File suggestions", body = DocumentSearchResult),
        (status = 500, description = "Search Exception", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, pairs), fields(correlation_id))]
pub async fn doc_suggest_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<DocumentSearchResult>> {
    let correlation_id = request_correlation_id(context.as_ref());
    let (params, repo_scope) =
        prepare(&state, &pairs, "document suggestion", &correlation_id).await?;

    // Suggestions ignore language and repository filters
    let request = DocumentSearchRequest {
        query: params.query,
        page: params.page,
        lang_filters: Vec::new(),
        repo_filters: Vec::new(),
        repo_scope,
    };
    state
        .clients
        .document
        .suggest(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::search_exception(e, "document suggestion", &correlation_id))
}

#[utoipa::path(
    get,
    path = "/api/code/search/symbol",
    tag = "code",
    params(
        ("q" = Option<String>, Query, description = "Symbol name or prefix"),
        ("p" = Option<String>, Query, description = "1-based page"),
        ("repoScope" = Option<String>, Query, description = "Comma-separated repository URIs; may repeat"),
    ),
    responses(
        (status = 200, description = "Symbol hits, same as /api/code/suggestions/symbol", body = SymbolSearchResult),
        (status = 500, description = "Search Exception", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, pairs), fields(correlation_id))]
pub async fn symbol_search_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<SymbolSearchResult>> {
    let correlation_id = request_correlation_id(context.as_ref());
    let (params, repo_scope) = prepare(&state, &pairs, "symbol search", &correlation_id).await?;

    let request = SymbolSearchRequest {
        query: params.query,
        page: params.page,
        repo_scope,
    };
    state
        .clients
        .symbol
        .suggest(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::search_exception(e, "symbol search", &correlation_id))
}

#[utoipa::path(
    get,
    path = "/api/code/search/commit",
    tag = "code",
    params(
        ("q" = Option<String>, Query, description = "Commit message query"),
        ("p" = Option<String>, Query, description = "1-based page"),
        ("repos" = Option<String>, Query, description = "Comma-separated repository URIs, URL-encoded"),
        ("repoScope" = Option<String>, Query, description = "Comma-separated repository URIs; may repeat"),
    ),
    responses(
        (status = 200, description = "Commit hits", body = CommitSearchResult),
        (status = 500, description = "Search Exception", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, pairs), fields(correlation_id))]
pub async fn commit_search_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<CommitSearchResult>> {
    let correlation_id = request_correlation_id(context.as_ref());
    let (params, repo_scope) = prepare(&state, &pairs, "commit search", &correlation_id).await?;

    let request = CommitSearchRequest {
        query: params.query,
        page: params.page,
        repo_filters: params.repos,
        repo_scope,
    };
    state
        .clients
        .commit
        .search(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::search_exception(e, "commit search", &correlation_id))
}
