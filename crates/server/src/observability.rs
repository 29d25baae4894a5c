use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "movie_catalog_operations_total",
        "Catalog operations by operation and outcome",
        &["op", "outcome"]
    )
    .expect("register operations_total")
});

pub static OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "movie_catalog_operation_duration_seconds",
        "Catalog operation duration in seconds",
        &["op"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register operation_duration")
});

/// Record one finished operation.
pub fn observe<T, E>(op: &str, started: std::time::Instant, result: &Result<T, E>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    OPERATIONS_TOTAL.with_label_values(&[op, outcome]).inc();
    OPERATION_DURATION
        .with_label_values(&[op])
        .observe(started.elapsed().as_secs_f64());
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
