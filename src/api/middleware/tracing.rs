//! Request logging for the query service.
//!
//! Every request runs inside a `query` span carrying the method and path.
//! Completion is logged once with the status and latency; 5xx responses are
//! logged at `WARN`.
//!
//! ```text
//! INFO query{method=POST path=/report}: request served status=200 latency_ms=3
//! WARN query{method=GET path=/report}: request failed status=500 latency_ms=1
//! ```

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, TraceLayer};
use tracing::Span;

type MakeQuerySpan = fn(&Request<Body>) -> Span;
type OnQueryResponse = fn(&Response<Body>, Duration, &Span);

/// Tracing layer applied to every query service route.
pub type QueryTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    MakeQuerySpan,
    DefaultOnRequest,
    OnQueryResponse,
>;

pub fn layer() -> QueryTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(query_span as MakeQuerySpan)
        .on_response(log_response as OnQueryResponse)
}

fn query_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "query",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

fn log_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status().as_u16();
    let latency_ms = latency.as_millis() as u64;

    if response.status().is_server_error() {
        tracing::warn!(status, latency_ms, "request failed");
    } else {
        tracing::info!(status, latency_ms, "request served");
    }
}
