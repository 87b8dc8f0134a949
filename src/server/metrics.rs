use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all metrics of this service
const PREFIX: &str = "makhraj";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Analysis Metrics
    pub static ref ANALYSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_analyses_total"), "Pronunciation analyses by result tier"),
        &["tier"]
    ).expect("Failed to create analyses_total metric");

    pub static ref ANALYSIS_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_analysis_duration_seconds"),
            "End to end analysis duration in seconds"
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["tier"]
    ).expect("Failed to create analysis_duration_seconds metric");

    // Transcription Metrics
    pub static ref TRANSCRIPTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_transcriptions_total"), "Transcription attempts by outcome"),
        &["outcome"]
    ).expect("Failed to create transcriptions_total metric");

    pub static ref TRANSCRIPTION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_transcription_duration_seconds"),
            "Transcription call duration in seconds"
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 8.0, 15.0]),
        &["outcome"]
    ).expect("Failed to create transcription_duration_seconds metric");

    // Persistence Metrics
    pub static ref PERSISTENCE_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_persistence_errors_total"), "Failed writes of analysis results"),
        &["operation"]
    ).expect("Failed to create persistence_errors_total metric");

    pub static ref UPLOAD_REJECTIONS_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_upload_rejections_total"),
        "Uploads that could not be read"
    ).expect("Failed to create upload_rejections_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already registered in tests
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ANALYSES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ANALYSIS_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(TRANSCRIPTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(TRANSCRIPTION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(PERSISTENCE_ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(UPLOAD_REJECTIONS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Maps a request path to a bounded label so ids do not explode cardinality.
pub fn endpoint_label(path: &str) -> &'static str {
    match path {
        "/" => "home",
        "/api/analyze-pronunciation" => "analyze",
        "/api/pronunciation-feedback" => "feedback",
        "/api/pronunciation-progress" => "progress",
        "/api/letters" => "letters",
        p if p.starts_with("/api/letters/") => "letter",
        _ => "other",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a finished analysis and the tier that produced it
pub fn record_analysis(tier: &str, duration: Duration) {
    ANALYSES_TOTAL.with_label_values(&[tier]).inc();
    ANALYSIS_DURATION_SECONDS
        .with_label_values(&[tier])
        .observe(duration.as_secs_f64());
}

/// Record a transcription call, `outcome` is "success" or an error kind
pub fn record_transcription(outcome: &str, duration: Duration) {
    TRANSCRIPTIONS_TOTAL.with_label_values(&[outcome]).inc();
    TRANSCRIPTION_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

pub fn record_persistence_error(operation: &str) {
    PERSISTENCE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn record_upload_rejection() {
    UPLOAD_REJECTIONS_TOTAL.inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
