//! APM transaction duration distribution route

use crate::middleware::RequestContext;
use crate::routes::request_correlation_id;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use codescope_apm::{ApmError, DistributionRequest, TransactionDistribution, phrase_filter_clause};
use codescope_common::{CorrelationId, sanitize_error};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DistributionQuery {
    pub transaction_name: String,
    pub transaction_type: String,
    pub transaction_id: Option<String>,
    pub trace_id: Option<String>,
    /// Range start, epoch milliseconds
    pub start: i64,
    /// Range end, epoch milliseconds
    pub end: i64,
    /// JSON object of field to exact value, e.g. `{"host.name":"web-01"}`
    pub ui_filters: Option<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/apm/services/{service_name}/transaction_groups/distribution",
            get(distribution_handler),
        )
        .with_state(state)
}

/// Turn the `uiFilters` object into phrase filter clauses
fn ui_filter_clauses(raw: Option<&str>, correlation_id: &CorrelationId) -> ApiResult<Vec<Value>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let invalid = |message: &str| ApiError::ValidationError {
        message: message.to_string(),
        field: Some("uiFilters".to_string()),
        correlation_id: correlation_id.clone(),
    };

    let parsed: Value =
        serde_json::from_str(raw).map_err(|_| invalid("uiFilters is not valid JSON"))?;
    let object = parsed
        .as_object()
        .ok_or_else(|| invalid("uiFilters must be a JSON object"))?;

    object
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok(phrase_filter_clause(key, text)),
            Value::Number(_) | Value::Bool(_) => Ok(phrase_filter_clause(key, &value.to_string())),
            _ => Err(invalid("uiFilters values must be strings, numbers or booleans")),
        })
        .collect()
}

fn distribution_error(error: ApmError, state: &AppState) -> ApiError {
    let correlation_id = error.correlation_id().clone();
    let unavailable = error.is_unavailable();
    sanitize_error(&error, "transaction distribution", &correlation_id);

    if unavailable {
        ApiError::SearchServiceUnavailable {
            timeout_duration: state.backend_timeout,
            correlation_id,
        }
    } else {
        ApiError::InternalServerError { correlation_id }
    }
}

#[utoipa::path(
    get,
    path = "/api/apm/services/{service_name}/transaction_groups/distribution",
    tag = "apm",
    params(
        ("service_name" = String, Path, description = "APM service name"),
        DistributionQuery,
    ),
    responses(
        (status = 200, description = "Duration histogram with one sample per bucket", body = TransactionDistribution),
        (status = 400, description = "Missing or malformed parameters", body = crate::ApiErrorResponse),
        (status = 500, description = "Distribution query failed", body = crate::ApiErrorResponse),
        (status = 503, description = "Search cluster unavailable", body = crate::ApiErrorResponse)
    )
)]
#[instrument(skip(state, context, query), fields(correlation_id))]
pub async fn distribution_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Path(service_name): Path<String>,
    query: Result<Query<DistributionQuery>, QueryRejection>,
) -> ApiResult<Json<TransactionDistribution>> {
    let correlation_id = request_correlation_id(context.as_ref());
    let Query(query) = query.map_err(|rejection| ApiError::ValidationError {
        message: rejection.body_text(),
        field: None,
        correlation_id: correlation_id.clone(),
    })?;

    info!(
        correlation_id = %correlation_id,
        service = %service_name,
        transaction = %query.transaction_name,
        "Transaction distribution request"
    );

    let request = DistributionRequest {
        ui_filters: ui_filter_clauses(query.ui_filters.as_deref(), &correlation_id)?,
        service_name,
        transaction_name: query.transaction_name,
        transaction_type: query.transaction_type,
        transaction_id: query.transaction_id,
        trace_id: query.trace_id,
        start: query.start,
        end: query.end,
    };

    state
        .distribution
        .distribution(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|e| distribution_error(e, &state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestResult, mock_state_with_backend, permitted};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use codescope_es::{EsSearchResponse, MockSearchBackend};
    use codescope_search::test_mocks::MockSearchClient;
    use serde_json::json;
    use tower::ServiceExt;

    const BASE: &str = "/api/apm/services/opbeans-node/transaction_groups/distribution";

    fn app(backend: MockSearchBackend) -> Router {
        routes(mock_state_with_backend(MockSearchClient::new(), permitted(), backend))
    }

    #[tokio::test]
    async fn test_distribution_returns_buckets() -> TestResult {
        let backend = MockSearchBackend::new().with_queued(vec![
            EsSearchResponse::empty()
                .with_total(2)
                .with_aggregations(json!({ "stats": { "value": 1500.0 } })),
            EsSearchResponse::empty().with_total(2).with_aggregations(json!({
                "distribution": { "buckets": [
                    { "key": 0.0, "doc_count": 2, "sample": { "hits": { "hits": [
                        { "_source": { "transaction": { "id": "tx-1", "sampled": true } } }
                    ] } } }
                ] }
            })),
        ]);
        let uri = format!(
            "{BASE}?transactionName=GET%20%2Fapi&transactionType=request&start=1000&end=2000&uiFilters=%7B%22host.name%22%3A%22web-01%22%7D"
        );

        let response = app(backend.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let distribution: TransactionDistribution = serde_json::from_slice(&bytes)?;
        assert_eq!(distribution.total_hits, 2);
        assert_eq!(distribution.bucket_size, 100);
        assert_eq!(distribution.buckets.len(), 1);

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        let histogram_body = requests[1].body.to_string();
        assert!(histogram_body.contains("web-01"));
        assert!(histogram_body.contains("opbeans-node"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_start_is_a_validation_error() -> TestResult {
        let uri = format!("{BASE}?transactionName=a&transactionType=request&end=2000");

        let response = app(MockSearchBackend::new())
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_unavailable() -> TestResult {
        let uri = format!("{BASE}?transactionName=a&transactionType=request&start=1&end=2");

        let response = app(MockSearchBackend::new().with_search_failure())
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        Ok(())
    }

    #[test]
    fn test_ui_filters_become_phrase_clauses() -> Result<(), ApiError> {
        let clauses = ui_filter_clauses(Some(r#"{"host.name":"web-01","http.status":200}"#), &CorrelationId::new())?;
        assert_eq!(
            clauses,
            vec![
                json!({ "match": { "host.name": { "query": "web-01", "type": "phrase" } } }),
                json!({ "match": { "http.status": { "query": "200", "type": "phrase" } } }),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_or_blank_ui_filters_are_empty() -> Result<(), ApiError> {
        assert!(ui_filter_clauses(None, &CorrelationId::new())?.is_empty());
        assert!(ui_filter_clauses(Some("  "), &CorrelationId::new())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_non_object_ui_filters_are_rejected() {
        let result = ui_filter_clauses(Some("[1,2]"), &CorrelationId::new());
        assert!(matches!(result, Err(ApiError::ValidationError { .. })));
        let result = ui_filter_clauses(Some("{not json"), &CorrelationId::new());
        assert!(matches!(result, Err(ApiError::ValidationError { .. })));
    }
}
