//! Stack-trace snippet resolution
//!
//! Resolves every frame of every request concurrently. The result nests
//! exactly like the input: one list per request, one entry per frame.

use crate::middleware::RequestContext;
use crate::routes::request_correlation_id;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    Json, Router,
    extract::{Extension, State},
    routing::post,
};
use codescope_common::{CorrelationId, sanitize_error};
use codescope_search::model::{SnippetSearchResult, StackTraceSnippetsRequest};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Body of `POST /api/code/integration/snippets`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SnippetsRequest {
    #[serde(default)]
    pub requests: Vec<StackTraceSnippetsRequest>,
}

/// Per request, per frame snippets
pub type SnippetsResponse = Vec<Vec<Vec<SnippetSearchResult>>>;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/code/integration/snippets", post(snippets_handler))
        .with_state(state)
}

/// Candidate repositories the caller may see, in request order
fn permitted_uris(request: &StackTraceSnippetsRequest, permitted: &HashSet<String>) -> Vec<String> {
    request
        .repo_uris
        .iter()
        .filter(|uri| permitted.contains(*uri))
        .cloned()
        .collect()
}

fn resolution_failed<E: std::fmt::Display>(
    error: E,
    what: &str,
    correlation_id: &CorrelationId,
) -> ApiError {
    let reference = sanitize_error(error, "snippet resolution", correlation_id);
    ApiError::SnippetResolutionFailed {
        reason: format!("{what}: {reference}"),
        correlation_id: correlation_id.clone(),
    }
}

#[utoipa::path(
    post,
    path = "/api/code/integration/snippets",
    tag = "code",
    request_body = SnippetsRequest,
    responses(
        (status = 200, description = "Snippets nested per request and per stack-trace item", body = Vec<Vec<Vec<SnippetSearchResult>>>),
        (status = 500, description = "A snippet lookup failed", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, body), fields(correlation_id))]
pub async fn snippets_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Json(body): Json<SnippetsRequest>,
) -> ApiResult<Json<SnippetsResponse>> {
    let correlation_id = request_correlation_id(context.as_ref());

    info!(
        correlation_id = %correlation_id,
        requests = body.requests.len(),
        "Snippet resolution request"
    );

    if body.requests.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let permitted = state
        .scope_resolver
        .permitted(&correlation_id)
        .await
        .map_err(|e| resolution_failed(e, "permitted repositories unavailable", &correlation_id))?;

    let client = &state.clients.integrations;
    let correlation = &correlation_id;

    let per_request = body.requests.iter().map(|request| {
        let resolves = request.resolve_requests(&permitted_uris(request, &permitted));
        async move {
            try_join_all(resolves.into_iter().map(|resolve| async move {
                client
                    .resolve_snippets(&resolve, correlation)
                    .await
                    .map_err(|e| resolution_failed(e, &resolve.file_path, correlation))
            }))
            .await
        }
    });

    let snippets = try_join_all(per_request).await?;
    Ok(Json(snippets))
}
