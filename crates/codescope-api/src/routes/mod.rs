pub mod apm;
pub mod health;
pub mod integration;
pub mod params;
pub mod search;

use crate::AppState;
use crate::middleware::RequestContext;
use axum::{Extension, Router, middleware};
use codescope_common::CorrelationId;

pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .merge(health::routes(state.clone()))
        .merge(search::routes(state.clone()))
        .merge(integration::routes(state.clone()))
        .merge(apm::routes(state))
        .merge(crate::openapi::routes())
        .layer(middleware::from_fn_with_state(
            request_timeout,
            crate::middleware::request_timeout_middleware,
        ))
        // Outermost, so the timeout layer already sees the request context
        .layer(middleware::from_fn(
            crate::middleware::correlation_id_middleware,
        ))
}

/// Correlation id from the middleware, recorded on the current span
pub(crate) fn request_correlation_id(context: Option<&Extension<RequestContext>>) -> CorrelationId {
    let correlation_id = context.map_or_else(CorrelationId::new, |ctx| ctx.correlation_id.clone());
    tracing::Span::current().record("correlation_id", correlation_id.to_string());
    correlation_id
}
