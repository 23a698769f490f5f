use crate::AppState;
use crate::middleware::RequestContext;
use crate::routes::request_correlation_id;
use axum::{Extension, Json, Router, extract::State, routing::get};
use serde_json::json;
use tracing::{info, instrument, warn};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check with Elasticsearch connectivity
///
/// Always answers 200; an unreachable cluster reports `degraded`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service status"))
)]
#[instrument(skip(state, context), fields(correlation_id))]
pub async fn health_check(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
) -> Json<serde_json::Value> {
    let correlation_id = request_correlation_id(context.as_ref());

    info!(correlation_id = %correlation_id, "Health check request");

    let (status, elasticsearch) = match state.backend.ping().await {
        Ok(()) => ("healthy", "connected"),
        Err(e) => {
            warn!(correlation_id = %correlation_id, error = %e, "Elasticsearch ping failed");
            ("degraded", "unavailable")
        }
    };

    Json(json!({
        "status": status,
        "service": "codescope-api",
        "elasticsearch": elasticsearch,
        "correlation_id": correlation_id.to_string()
    }))
}
