use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

use crate::errors::Result;

const LATENCY_BUCKETS: &[f64] = &[0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref READINGS_RECEIVED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "sensorlog_readings_received_total",
        "Total ingestion requests received"
    ))
    .expect("valid metric options");
    pub static ref READINGS_STORED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "sensorlog_readings_stored_total",
        "Total readings durably stored"
    ))
    .expect("valid metric options");
    pub static ref READINGS_REJECTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "sensorlog_readings_rejected_total",
        "Total ingestion requests rejected by validation"
    ))
    .expect("valid metric options");
    pub static ref STORAGE_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "sensorlog_storage_failures_total",
        "Total store operations that failed"
    ))
    .expect("valid metric options");
    pub static ref QUERIES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "sensorlog_queries_total",
        "Total data queries served"
    ))
    .expect("valid metric options");
    pub static ref APPEND_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sensorlog_append_latency_seconds",
            "Time taken to append one reading"
        )
        .buckets(LATENCY_BUCKETS.to_vec())
    )
    .expect("valid metric options");
    pub static ref QUERY_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sensorlog_query_latency_seconds",
            "Time taken to answer a range or latest query"
        )
        .buckets(LATENCY_BUCKETS.to_vec())
    )
    .expect("valid metric options");
}

/// Registers every collector with [`REGISTRY`]. Call once at startup.
pub fn init_metrics() -> Result<()> {
    REGISTRY.register(Box::new(READINGS_RECEIVED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READINGS_STORED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READINGS_REJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORAGE_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(QUERIES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(APPEND_LATENCY_SECONDS.clone()))?;
    REGISTRY.register(Box::new(QUERY_LATENCY_SECONDS.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    // TextEncoder only writes UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_metrics_are_exported() {
        init_metrics().unwrap();
        READINGS_RECEIVED_TOTAL.inc();
        APPEND_LATENCY_SECONDS.observe(0.002);

        let text = gather_metrics().unwrap();
        assert!(text.contains("sensorlog_readings_received_total"));
        assert!(text.contains("sensorlog_append_latency_seconds_bucket"));

        // a second registration is refused
        assert!(init_metrics().is_err());
    }
}
