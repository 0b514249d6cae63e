//! Request accounting and response headers.
//!
//! Every API call gets one span and one "Request finished" event. Request
//! counters are labelled by route group, searches by where their results came
//! from, and failures by their error code.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, field, info, info_span};
use uuid::Uuid;

use super::AppState;
use super::error::ErrorCode;
use crate::services::ResultSource;

const API_ROUTE_GROUPS: [&str; 8] = [
    "search",
    "case",
    "cases",
    "suggest",
    "stats",
    "health",
    "test-scraper",
    "metrics",
];

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    (
        "content-security-policy",
        "default-src 'self'; style-src 'self' 'unsafe-inline'; frame-ancestors 'none'",
    ),
];

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Metric label for a request path: the first segment under `/api`, `ui` for
/// the embedded pages, `other` for anything else.
fn route_group(path: &str) -> &'static str {
    let Some(rest) = path.strip_prefix("/api/") else {
        return "ui";
    };
    let first = rest.split('/').next().unwrap_or_default();
    API_ROUTE_GROUPS
        .iter()
        .copied()
        .find(|group| *group == first)
        .unwrap_or("other")
}

pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = route_group(req.uri().path());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        route,
        source = field::Empty,
        code = field::Empty,
    );

    let response = next.run(req).instrument(span.clone()).await;
    let status = response.status().as_u16();

    let labels = [
        ("method", method),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());

    if let Some(source) = response.extensions().get::<ResultSource>() {
        metrics::counter!("case_searches_total", "source" => source.as_str()).increment(1);
        span.record("source", source.as_str());
    }
    if let Some(ErrorCode(code)) = response.extensions().get::<ErrorCode>() {
        metrics::counter!("api_errors_total", "code" => *code).increment(1);
        span.record("code", *code);
    }

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    span.in_scope(|| info!(status, duration_ms, "Request finished"));

    response
}

pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    response
}
