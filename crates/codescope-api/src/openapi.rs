//! `OpenAPI` documentation generation

use axum::{Json, Router, response::IntoResponse, routing::get};
use utoipa::OpenApi;

/// `OpenAPI` documentation for the Codescope API
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::search::repo_search_handler,
        crate::routes::search::repo_suggest_handler,
        crate::routes::search::doc_search_handler,
        crate::routes::search::doc_suggest_handler,
        crate::routes::search::symbol_search_handler,
        crate::routes::search::commit_search_handler,
        crate::routes::integration::snippets_handler,
        crate::routes::apm::distribution_handler,
    ),
    components(
        schemas(
            // Code search schemas
            codescope_search::model::RepositoryHit,
            codescope_search::model::RepositorySearchResult,
            codescope_search::model::DocumentHit,
            codescope_search::model::FacetCount,
            codescope_search::model::DocumentSearchResult,
            codescope_search::model::SymbolHit,
            codescope_search::model::SymbolSearchResult,
            codescope_search::model::CommitInfo,
            codescope_search::model::CommitSearchResult,
            codescope_search::model::ReferenceInfo,
            codescope_search::model::ReferenceType,

            // Integration schemas
            crate::routes::integration::SnippetsRequest,
            codescope_search::model::StackTraceSnippetsRequest,
            codescope_search::model::StackTraceItem,
            codescope_search::model::SnippetSearchResult,

            // APM schemas
            codescope_apm::TransactionDistribution,
            codescope_apm::DistributionBucket,
            codescope_apm::BucketSample,

            // Common schemas
            crate::ApiErrorResponse,
        )
    ),
    tags(
        (name = "code", description = "Repository, document, symbol and commit search"),
        (name = "apm", description = "APM transaction analytics"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "Codescope API",
        version = "0.2.0",
        description = "Code search and APM transaction distribution over Elasticsearch",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    )
)]
pub struct ApiDoc;

pub fn routes() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

/// Returns `OpenAPI` JSON as a response
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
