//! Request middleware
//!
//! Every request gets a [`RequestContext`] extension carrying its correlation
//! id, taken from the `X-Correlation-ID` header when the caller sent a valid
//! UUID. The id is echoed back on the response.

use crate::ApiError;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use codescope_common::CorrelationId;
use std::time::Duration;

pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Per-request context shared with handlers
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
}

impl RequestContext {
    fn from_request(request: &Request) -> Self {
        let correlation_id = request
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(CorrelationId::parse)
            .unwrap_or_default();
        Self { correlation_id }
    }
}

pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let context = RequestContext::from_request(&request);
    let correlation_id = context.correlation_id.clone();
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if !response.headers().contains_key(CORRELATION_ID_HEADER) {
        if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }
    }
    response
}

/// Abort requests that run longer than the configured budget
pub async fn request_timeout_middleware(
    State(timeout): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let correlation_id = request
        .extensions()
        .get::<RequestContext>()
        .map_or_else(CorrelationId::new, |ctx| ctx.correlation_id.clone());

    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError::RequestTimeout {
            timeout_duration: timeout,
            correlation_id,
        }
        .into_response(),
    }
}
