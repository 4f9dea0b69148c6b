//! Metrics collection for observability

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    HistogramVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::Lazy;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Upload pipeline
    pub uploads: CounterVec,
    pub upload_duration: HistogramVec,

    // OCR model
    pub ocr_requests: CounterVec,
    pub ocr_request_duration: HistogramVec,

    // GitHub API
    pub github_requests: CounterVec,
    pub github_request_duration: HistogramVec,
    pub github_syncs: CounterVec,

    // Inbound webhooks
    pub webhook_events: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let uploads = register_counter_vec_with_registry!(
            Opts::new("uploads_total", "Total uploads by file kind and outcome"),
            &["file_kind", "status"],
            registry
        )?;

        let upload_duration = register_histogram_vec_with_registry!(
            "upload_duration_seconds",
            "End-to-end upload handling duration in seconds",
            &["file_kind"],
            registry
        )?;

        let ocr_requests = register_counter_vec_with_registry!(
            Opts::new("ocr_requests_total", "Total OCR model requests"),
            &["status"],
            registry
        )?;

        let ocr_request_duration = register_histogram_vec_with_registry!(
            "ocr_request_duration_seconds",
            "OCR model request duration in seconds",
            &["status"],
            registry
        )?;

        let github_requests = register_counter_vec_with_registry!(
            Opts::new("github_requests_total", "Total GitHub API requests"),
            &["operation", "status"],
            registry
        )?;

        let github_request_duration = register_histogram_vec_with_registry!(
            "github_request_duration_seconds",
            "GitHub API request duration in seconds",
            &["operation"],
            registry
        )?;

        let github_syncs = register_counter_vec_with_registry!(
            Opts::new("github_syncs_total", "Total content sync attempts"),
            &["status"],
            registry
        )?;

        let webhook_events = register_counter_vec_with_registry!(
            Opts::new("webhook_events_total", "Total inbound webhook deliveries"),
            &["event", "status"],
            registry
        )?;

        Ok(Self {
            registry,
            uploads,
            upload_duration,
            ocr_requests,
            ocr_request_duration,
            github_requests,
            github_request_duration,
            github_syncs,
            webhook_events,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a finished upload
    pub fn record_upload(&self, file_kind: &str, success: bool, elapsed: Duration) {
        let status = if success { "success" } else { "error" };
        self.uploads.with_label_values(&[file_kind, status]).inc();
        self.upload_duration
            .with_label_values(&[file_kind])
            .observe(elapsed.as_secs_f64());
    }

    /// Record an OCR request
    pub fn record_ocr(&self, status: &str, elapsed: Duration) {
        self.ocr_requests.with_label_values(&[status]).inc();
        self.ocr_request_duration
            .with_label_values(&[status])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a GitHub API call
    pub fn record_github(&self, operation: &str, success: bool, elapsed: Duration) {
        let status = if success { "success" } else { "error" };
        self.github_requests.with_label_values(&[operation, status]).inc();
        self.github_request_duration
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a sync outcome
    pub fn record_sync(&self, status: &str) {
        self.github_syncs.with_label_values(&[status]).inc();
    }

    /// Record a webhook delivery
    pub fn record_webhook(&self, event: &str, status: &str) {
        self.webhook_events.with_label_values(&[event, status]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = Metrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_export_includes_recorded_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_upload("pdf", true, Duration::from_millis(120));
        metrics.record_github("put_contents", false, Duration::from_millis(40));
        metrics.record_webhook("pull_request", "accepted");

        let text = metrics.export_prometheus();
        assert!(text.contains("uploads_total{file_kind=\"pdf\",status=\"success\"} 1"));
        assert!(text.contains("github_requests_total{operation=\"put_contents\",status=\"error\"} 1"));
        assert!(text.contains("webhook_events_total"));
    }

    #[test]
    fn test_record_ocr() {
        let metrics = Metrics::new().unwrap();
        metrics.record_ocr("success", Duration::from_millis(800));
        metrics.record_ocr("error", Duration::from_secs(30));
        // Metrics should be recorded without panicking
    }
}
