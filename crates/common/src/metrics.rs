use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, Encoder, Histogram,
    HistogramVec, IntCounter, TextEncoder,
};

lazy_static! {
    // Stream consumption
    pub static ref STREAM_MESSAGES_TOTAL: IntCounter = register_int_counter!(
        "kafka_messages_total",
        "Total number of messages fetched from the stream"
    )
    .expect("metric cannot be created");

    pub static ref STREAM_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "kafka_errors_total",
        "Total number of fetch/decode/validate/persist/commit failures"
    )
    .expect("metric cannot be created");

    pub static ref MESSAGE_PROCESS_DURATION: Histogram = register_histogram!(
        "kafka_process_duration_seconds",
        "Time spent processing a single stream message"
    )
    .expect("metric cannot be created");

    // Store
    pub static ref DB_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "db_errors_total",
        "Total number of failed database operations"
    )
    .expect("metric cannot be created");

    pub static ref STORE_OP_DURATION: HistogramVec = register_histogram_vec!(
        "store_op_duration_seconds",
        "Database operation duration in seconds",
        &["op"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("metric cannot be created");

    // Cache
    pub static ref CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        "cache_hits_total",
        "Total number of cache hits"
    )
    .expect("metric cannot be created");

    pub static ref CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        "cache_misses_total",
        "Total number of cache misses"
    )
    .expect("metric cannot be created");

    // HTTP
    pub static ref HTTP_REQUESTS_TOTAL: IntCounter = register_int_counter!(
        "http_requests_total",
        "Total number of HTTP requests served"
    )
    .expect("metric cannot be created");

    pub static ref HTTP_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "http_errors_total",
        "Total number of HTTP error responses"
    )
    .expect("metric cannot be created");

    pub static ref HTTP_DURATION: Histogram = register_histogram!(
        "http_request_duration_seconds",
        "HTTP request handling duration"
    )
    .expect("metric cannot be created");
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_metrics() {
        STREAM_MESSAGES_TOTAL.inc();
        CACHE_HITS_TOTAL.inc();
        let metrics = gather_metrics().unwrap();
        assert!(metrics.contains("kafka_messages_total"));
        assert!(metrics.contains("cache_hits_total"));
    }

    #[test]
    fn test_store_duration_labels() {
        STORE_OP_DURATION.with_label_values(&["save"]).observe(0.01);
        let metrics = gather_metrics().unwrap();
        assert!(metrics.contains("store_op_duration_seconds"));
    }
}
