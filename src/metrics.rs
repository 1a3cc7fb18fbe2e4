//! Prometheus metrics

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Setup Prometheus metrics exporter
/// Returns a handle that can be used to retrieve metrics
pub fn setup_metrics() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!("Prometheus metrics exporter installed");

    Ok(handle)
}

/// Record a finished lookup by outcome
pub fn record_lookup(outcome: &str) {
    metrics::counter!("lora_keywords_lookups_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a cache hit; negative hits are cached empty results
pub fn record_cache_hit(negative: bool) {
    let kind = if negative { "negative" } else { "positive" };
    metrics::counter!("lora_keywords_cache_hits_total", "kind" => kind).increment(1);
}

/// Record a cache miss
pub fn record_cache_miss() {
    metrics::counter!("lora_keywords_cache_misses_total").increment(1);
}

/// Record a registry request by result
pub fn record_registry_request(result: &str) {
    metrics::counter!("lora_keywords_registry_requests_total",
        "result" => result.to_string()
    )
    .increment(1);
}

/// Record a failed cache write
pub fn record_cache_write_failure() {
    metrics::counter!("lora_keywords_cache_write_failures_total").increment(1);
}
