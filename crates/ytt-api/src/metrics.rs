//! Prometheus metrics for the API server.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "ytt_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ytt_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "ytt_http_requests_in_flight";

    // Transcript metrics
    pub const TRANSCRIPTS_TOTAL: &str = "ytt_transcripts_total";
    pub const TRANSCRIPT_SELECTION_TOTAL: &str = "ytt_transcript_selection_total";
    pub const PROVIDER_DURATION_SECONDS: &str = "ytt_provider_duration_seconds";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "ytt_rate_limit_hits_total";
    pub const RATE_LIMITER_CLIENTS: &str = "ytt_rate_limiter_clients";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the outcome of one transcript request.
pub fn record_transcript_outcome(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::TRANSCRIPTS_TOTAL, &labels).increment(1);
}

/// Record which selection tier produced a transcript.
pub fn record_selection_tier(tier: &str) {
    let labels = [("tier", tier.to_string())];
    counter!(names::TRANSCRIPT_SELECTION_TOTAL, &labels).increment(1);
}

/// Record time spent talking to the caption provider.
pub fn record_provider_duration(duration: Duration) {
    histogram!(names::PROVIDER_DURATION_SECONDS).record(duration.as_secs_f64());
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Update the tracked-clients gauge.
pub fn set_rate_limiter_clients(count: usize) {
    gauge!(names::RATE_LIMITER_CLIENTS).set(count as f64);
}

/// Collapse paths outside the known routes so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    match path {
        "/" | "/health" | "/get_transcript" | "/metrics" => path.to_string(),
        p if p.starts_with("/static/") => "/static/:file".to_string(),
        _ => "/:unknown".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
