use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

/// Prometheus metrics for the cafe service
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    // HTTP metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub http_requests_in_flight: GaugeVec,

    // Database metrics
    pub database_operations_total: CounterVec,
    pub database_operation_duration_seconds: HistogramVec,

    // Business metrics
    pub menu_requests_total: CounterVec,
    pub menu_fallbacks_total: CounterVec,
    pub menu_seed_writes_total: CounterVec,
    pub inquiries_total: CounterVec,
}

impl Metrics {
    /// Create a new metrics instance with all metrics registered
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        info!("Initializing Prometheus metrics");

        let http_requests_total = CounterVec::new(
            Opts::new(
                "http_requests_total",
                "Total number of HTTP requests processed",
            ),
            &["method", "endpoint", "status_code"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "endpoint"],
        )?;

        let http_requests_in_flight = GaugeVec::new(
            Opts::new(
                "http_requests_in_flight",
                "Number of HTTP requests currently being processed",
            ),
            &["method", "endpoint"],
        )?;

        let database_operations_total = CounterVec::new(
            Opts::new(
                "database_operations_total",
                "Total number of document store operations",
            ),
            &["operation", "collection", "status"],
        )?;

        let database_operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "database_operation_duration_seconds",
                "Document store operation duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
            &["operation", "collection"],
        )?;

        let menu_requests_total = CounterVec::new(
            Opts::new("menu_requests_total", "Menu queries by data source"),
            &["source"],
        )?;

        let menu_fallbacks_total = CounterVec::new(
            Opts::new(
                "menu_fallbacks_total",
                "Menu queries answered from sample data after a store failure",
            ),
            &["reason"],
        )?;

        let menu_seed_writes_total = CounterVec::new(
            Opts::new("menu_seed_writes_total", "Menu seed write attempts by result"),
            &["result"],
        )?;

        let inquiries_total = CounterVec::new(
            Opts::new("inquiries_total", "Contact-form inquiries by outcome"),
            &["status"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(database_operations_total.clone()))?;
        registry.register(Box::new(database_operation_duration_seconds.clone()))?;
        registry.register(Box::new(menu_requests_total.clone()))?;
        registry.register(Box::new(menu_fallbacks_total.clone()))?;
        registry.register(Box::new(menu_seed_writes_total.clone()))?;
        registry.register(Box::new(inquiries_total.clone()))?;

        info!("Prometheus metrics initialized successfully");

        Ok(Metrics {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            database_operations_total,
            database_operation_duration_seconds,
            menu_requests_total,
            menu_fallbacks_total,
            menu_seed_writes_total,
            inquiries_total,
        })
    }

    /// Get the metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    /// Record HTTP request metrics
    pub fn record_http_request(
        &self,
        method: &str,
        endpoint: &str,
        status_code: u16,
        duration_seconds: f64,
    ) {
        let status_str = status_code.to_string();

        self.http_requests_total
            .with_label_values(&[method, endpoint, &status_str])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, endpoint])
            .observe(duration_seconds);
    }

    /// Record document store operation metrics
    pub fn record_database_operation(
        &self,
        operation: &str,
        collection: &str,
        success: bool,
        duration_seconds: f64,
    ) {
        let status = if success { "success" } else { "error" };

        self.database_operations_total
            .with_label_values(&[operation, collection, status])
            .inc();

        self.database_operation_duration_seconds
            .with_label_values(&[operation, collection])
            .observe(duration_seconds);
    }

    /// Record where a menu answer came from (`store` or `fallback`)
    pub fn record_menu_request(&self, source: &str) {
        self.menu_requests_total.with_label_values(&[source]).inc();
    }

    pub fn record_menu_fallback(&self, reason: &str) {
        self.menu_fallbacks_total.with_label_values(&[reason]).inc();
    }

    /// Record a seed write outcome (`created`, `existing` or `failed`)
    pub fn record_seed_write(&self, result: &str) {
        self.menu_seed_writes_total
            .with_label_values(&[result])
            .inc();
    }

    /// Record an inquiry outcome (`stored` or `dropped`)
    pub fn record_inquiry(&self, status: &str) {
        self.inquiries_total.with_label_values(&[status]).inc();
    }

    /// Increment in-flight requests
    pub fn increment_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .inc();
    }

    /// Decrement in-flight requests
    pub fn decrement_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .dec();
    }
}
