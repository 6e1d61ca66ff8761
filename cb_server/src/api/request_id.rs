//! Request ID middleware for tracing and debugging.
//!
//! Every request gets an ID, taken from the caller's `x-request-id` header
//! or freshly generated, echoed back on the response. The same middleware
//! records request metrics.

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::metrics;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware to tag requests and responses with an ID and record metrics
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use cb_server::api::request_id::request_id_middleware;
///
/// # async fn example() {
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(middleware::from_fn(request_id_middleware));
/// # }
/// ```
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = get_or_generate_request_id(request.headers());
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let method = request.method().clone();
    // Route template rather than raw URI, so IDs don't explode label cardinality
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        "Request started"
    );

    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    let status = response.status();
    metrics::http_requests_total(method.as_str(), &path, status.as_u16());
    metrics::http_request_duration_ms(method.as_str(), &path, elapsed_ms);

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = %status,
        elapsed_ms = elapsed_ms,
        "Request completed"
    );

    response
}

/// Request ID wrapper for extracting from request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Axum extractor for request ID
impl<S> axum::extract::FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request ID not found in extensions",
        ))
    }
}
