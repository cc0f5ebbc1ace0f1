use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .unwrap();

    // Generation Metrics
    pub static ref GENERATION_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "generation_requests_total",
        "Total number of upstream generation calls by outcome",
        &["task", "status"]
    )
    .unwrap();

    pub static ref GENERATION_RETRIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "generation_retries_total",
        "Total number of rate-limit retries against the model",
        &["task"]
    )
    .unwrap();

    pub static ref GENERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "generation_duration_seconds",
        "Model generation duration in seconds, backoff included",
        &["task"],
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Outcome label for a finished generation.
pub fn generation_status(result: &Result<String, crate::error::GenerationError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(err) if err.is_rate_limited() => "rate_limited",
        Err(crate::error::GenerationError::MissingCredential) => "unconfigured",
        Err(crate::error::GenerationError::MalformedResponse(_)) => "malformed",
        Err(_) => "error",
    }
}

pub fn record_generation(task: &str, status: &str, duration_secs: f64) {
    GENERATION_REQUESTS_TOTAL
        .with_label_values(&[task, status])
        .inc();
    GENERATION_DURATION_SECONDS
        .with_label_values(&[task])
        .observe(duration_secs);
}

pub fn record_generation_retry(task: &str) {
    GENERATION_RETRIES_TOTAL.with_label_values(&[task]).inc();
}
